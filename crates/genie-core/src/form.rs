//! Form state and the generation payload built from it.

use serde::{Deserialize, Serialize};

/// The fields the user fills in before generating a prompt.
///
/// `api_key` and `goal` are required; everything else may stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub api_key: String,
    pub goal: String,
    pub context: String,
    pub constraints: String,
    pub tone: String,
    pub output_format: String,
    pub subject: String,
}

/// Addresses a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    ApiKey,
    Goal,
    Context,
    Constraints,
    Tone,
    OutputFormat,
    Subject,
}

impl FormState {
    /// Create a form with only the goal filled in.
    pub fn with_goal(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Self::default()
        }
    }

    /// Read a field.
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::ApiKey => &self.api_key,
            FormField::Goal => &self.goal,
            FormField::Context => &self.context,
            FormField::Constraints => &self.constraints,
            FormField::Tone => &self.tone,
            FormField::OutputFormat => &self.output_format,
            FormField::Subject => &self.subject,
        }
    }

    /// Overwrite a field.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::ApiKey => &mut self.api_key,
            FormField::Goal => &mut self.goal,
            FormField::Context => &mut self.context,
            FormField::Constraints => &mut self.constraints,
            FormField::Tone => &mut self.tone,
            FormField::OutputFormat => &mut self.output_format,
            FormField::Subject => &mut self.subject,
        };
        *slot = value.into();
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn has_goal(&self) -> bool {
        !self.goal.trim().is_empty()
    }

    /// Build the wire payload from trimmed field values.
    pub fn to_request(&self) -> GenerateRequest {
        GenerateRequest {
            api_key: self.api_key.trim().to_string(),
            goal: self.goal.trim().to_string(),
            context: self.context.trim().to_string(),
            constraints: self.constraints.trim().to_string(),
            tone: self.tone.trim().to_string(),
            output_format: self.output_format.trim().to_string(),
            subject: self.subject.trim().to_string(),
        }
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub api_key: String,
    pub goal: String,
    pub context: String,
    pub constraints: String,
    pub tone: String,
    pub output_format: String,
    pub subject: String,
}

/// A generated prompt and the backend's explanation of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub prompt: String,
    pub explanation: String,
}
