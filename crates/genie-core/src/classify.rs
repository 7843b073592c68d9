//! Turns raw backend responses into results or user-facing errors.

use crate::backend::BackendResponse;
use crate::form::GenerationResult;
use crate::GenieError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Detail shown when the backend gives nothing usable.
pub const DEFAULT_DETAIL: &str = "Something went wrong.";

/// Summary shown when no response was received at all.
pub const UNREACHABLE_SUMMARY: &str = "Backend unreachable.";

/// Fallback detail for transport failures without an error message.
pub const UNREACHABLE_DETAIL: &str = "Network or server unreachable.";

/// Summary for 2xx responses that don't carry a prompt and explanation.
pub const MALFORMED_SUMMARY: &str = "Malformed response from backend.";

/// Replaces the raw detail of quota failures.
pub const QUOTA_REMEDIATION: &str = "\
Your API key has run out of quota or is being rate limited.
1. Enable billing (or raise the quota) for the project that owns the key.
2. If the key is exhausted or revoked, create a new API key.
3. Paste the new key into the API key settings and generate again.";

const QUOTA_MARKERS: [&str; 4] = ["quota", "rate limit", "billing", "api key quota"];

/// How an error should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    Normal,
    Quota,
}

/// What the user sees after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// One-line message, also used as the toast text.
    pub summary: String,
    /// Longer text for the inline error panel.
    pub detail: String,
    pub category: ErrorCategory,
}

impl ErrorInfo {
    pub fn normal(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
            category: ErrorCategory::Normal,
        }
    }

    pub fn is_quota(&self) -> bool {
        self.category == ErrorCategory::Quota
    }
}

/// A classified failure: what to show, and what to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub status: u16,
    pub info: ErrorInfo,
}

impl Failure {
    /// The error matching this failure's category.
    pub fn to_error(&self) -> GenieError {
        match self.info.category {
            ErrorCategory::Quota => GenieError::QuotaExceeded {
                summary: self.info.summary.clone(),
            },
            ErrorCategory::Normal => GenieError::RequestFailed {
                status: self.status,
                summary: self.info.summary.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    prompt: String,
    explanation: String,
}

/// Classify a response the backend actually sent.
pub fn classify_response(response: &BackendResponse) -> Result<GenerationResult, Failure> {
    if !response.is_success() {
        return Err(classify_failure(response.status, &response.body));
    }

    match serde_json::from_str::<SuccessBody>(&response.body) {
        Ok(body) => Ok(GenerationResult {
            prompt: body.prompt,
            explanation: body.explanation,
        }),
        Err(e) => {
            tracing::warn!("Success response did not match the expected shape: {}", e);
            let detail = if response.body.trim().is_empty() {
                DEFAULT_DETAIL.to_string()
            } else {
                response.body.clone()
            };
            Err(Failure {
                status: response.status,
                info: ErrorInfo::normal(MALFORMED_SUMMARY, detail),
            })
        }
    }
}

/// Classify a non-success status and its body.
pub fn classify_failure(status: u16, body: &str) -> Failure {
    let json = serde_json::from_str::<Value>(body).ok();

    let summary = json
        .as_ref()
        .and_then(extract_detail)
        .unwrap_or_else(|| DEFAULT_DETAIL.to_string());

    let quota = status == 429 || mentions_quota(&summary) || mentions_quota(body);

    let info = if quota {
        ErrorInfo {
            summary,
            detail: QUOTA_REMEDIATION.to_string(),
            category: ErrorCategory::Quota,
        }
    } else {
        ErrorInfo::normal(summary, raw_detail(json.as_ref(), body))
    };

    Failure { status, info }
}

/// Error info for a request that never got a response.
pub fn transport_failure(message: &str) -> ErrorInfo {
    let detail = if message.trim().is_empty() {
        UNREACHABLE_DETAIL
    } else {
        message
    };
    ErrorInfo::normal(UNREACHABLE_SUMMARY, detail)
}

fn mentions_quota(text: &str) -> bool {
    let lower = text.to_lowercase();
    QUOTA_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Pull a readable message out of `detail` or `message`.
fn extract_detail(json: &Value) -> Option<String> {
    let value = json
        .get("detail")
        .filter(|v| !v.is_null())
        .or_else(|| json.get("message").filter(|v| !v.is_null()))?;

    let text = match value {
        Value::String(s) => s.clone(),
        // FastAPI validation errors: [{"loc": [...], "msg": "...", "type": "..."}]
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                value.to_string()
            } else {
                msgs.join("; ")
            }
        }
        other => other.to_string(),
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn raw_detail(json: Option<&Value>, body: &str) -> String {
    match json {
        Some(Value::String(s)) => s.clone(),
        Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| body.to_string()),
        None if body.trim().is_empty() => DEFAULT_DETAIL.to_string(),
        None => body.to_string(),
    }
}
