mod desktop;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use desktop::{BrowserOpener, SystemClipboard};
use dotenvy::dotenv;
use genie_client::HttpBackend;
use genie_core::{
    CredentialStore, FileCredentialStore, FormField, GenerationBackend, GenieConfig, GenieError,
    Platform, RequestLifecycleController, Toast, ToastKind,
};
use log::{debug, info, warn};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an optimized prompt for a goal
    Generate {
        /// What the prompt should achieve
        #[arg(short, long)]
        goal: String,

        /// Audience and background information
        #[arg(long, default_value = "")]
        context: String,

        /// Word counts, requirements, things to avoid
        #[arg(long, default_value = "")]
        constraints: String,

        /// Desired tone (professional, casual, ...)
        #[arg(long, default_value = "")]
        tone: String,

        /// Desired output format (bullets, JSON, markdown, ...)
        #[arg(long = "format", default_value = "")]
        output_format: String,

        /// Main topic or product
        #[arg(long, default_value = "")]
        subject: String,

        /// API key to use (saved for next time)
        #[arg(long)]
        api_key: Option<String>,

        /// Copy the generated prompt to the clipboard
        #[arg(long)]
        copy: bool,

        /// Copy the prompt and open it on an AI platform (see `platforms`)
        #[arg(long, value_name = "PLATFORM")]
        open: Option<String>,

        /// Print the final state as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// List the AI platforms a prompt can be opened in
    Platforms,

    /// Check that the backend is reachable
    Health,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save an API key
    Set {
        /// The key value
        value: String,
    },
    /// Show the saved API key (masked)
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let config = GenieConfig::from_env();

    match cli.command {
        Commands::Generate {
            goal,
            context,
            constraints,
            tone,
            output_format,
            subject,
            api_key,
            copy,
            open,
            json,
        } => {
            let platform = match open {
                Some(ref name) => match Platform::find(&config.platforms, name) {
                    Some(p) => Some(p.clone()),
                    None => bail!("Unknown platform '{}'. Run `promptgenie platforms`.", name),
                },
                None => None,
            };

            let controller = genie_client::controller(config)
                .context("Failed to set up the PromptGenie client")?
                .with_clipboard(Arc::new(SystemClipboard))
                .with_opener(Arc::new(BrowserOpener));

            if let Some(key) = api_key {
                controller.set_field(FormField::ApiKey, key);
            }
            controller.set_field(FormField::Goal, goal);
            controller.set_field(FormField::Context, context);
            controller.set_field(FormField::Constraints, constraints);
            controller.set_field(FormField::Tone, tone);
            controller.set_field(FormField::OutputFormat, output_format);
            controller.set_field(FormField::Subject, subject);

            run_generation(&controller, copy, platform.as_ref(), json).await?;
        }
        Commands::Key { action } => {
            let store = FileCredentialStore::from_config(&config)?;
            match action {
                KeyAction::Set { value } => {
                    let value = value.trim();
                    if value.is_empty() {
                        bail!("API key must not be empty");
                    }
                    store
                        .save(&config.credential_key, value)
                        .context("Failed to save API key")?;
                    info!("API key saved to {:?}", store.path());
                }
                KeyAction::Show => match store.load(&config.credential_key)? {
                    Some(key) => println!("{}", mask_key(&key)),
                    None => println!("No API key saved. Run `promptgenie key set <KEY>`."),
                },
            }
        }
        Commands::Platforms => {
            for platform in &config.platforms {
                println!("{:<10} {}", platform.name, platform.url);
            }
        }
        Commands::Health => {
            let backend = HttpBackend::new(&config)?;
            match backend.health_check().await {
                Ok(true) => println!("Backend at {} is up.", config.backend_url),
                Ok(false) => bail!("Backend at {} answered with an error", config.backend_url),
                Err(e) => return Err(e).context("Health check failed"),
            }
        }
    }

    Ok(())
}

async fn run_generation(
    controller: &RequestLifecycleController,
    copy: bool,
    platform: Option<&Platform>,
    json: bool,
) -> Result<()> {
    info!("Generating prompt... (this may take a while)");
    let outcome = controller.submit().await;
    let snapshot = controller.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        if let Some(ref toast) = snapshot.toast {
            print_toast(toast);
        }
        if let Some(ref result) = snapshot.result {
            println!("── Prompt ──\n{}\n", result.prompt);
            println!("── Explanation ──\n{}", result.explanation);
        }
        if let Some(ref error) = snapshot.error {
            eprintln!("{}\n\n{}", error.summary, error.detail);
        }
    }

    let result = match outcome {
        Ok(result) => result,
        Err(GenieError::MissingCredential) => {
            bail!("No API key set. Run `promptgenie key set <KEY>` or pass --api-key.")
        }
        Err(e) => return Err(e).context("Prompt generation failed"),
    };

    if copy && controller.copy_to_clipboard(&result.prompt).await {
        debug!("Prompt copied");
    }

    if let Some(platform) = platform {
        match controller.copy_and_open(&result.prompt, platform).await {
            Some(pending) => {
                if let Some(toast) = controller.toast() {
                    print_toast(&toast);
                }
                if !pending.wait().await {
                    warn!("Could not open {}; the prompt is on your clipboard", platform.url);
                }
            }
            None => {
                if let Some(toast) = controller.toast() {
                    print_toast(&toast);
                }
            }
        }
    } else if copy {
        if let Some(toast) = controller.toast() {
            print_toast(&toast);
        }
    }

    controller.shutdown();
    Ok(())
}

fn print_toast(toast: &Toast) {
    match toast.kind {
        ToastKind::Success => eprintln!("✓ {}", toast.text),
        ToastKind::Error => eprintln!("⚠ {}", toast.text),
    }
}

/// Show only the edges of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
