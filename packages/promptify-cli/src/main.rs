//! Promptify CLI
//!
//! Generates image-generation prompts for a list of image URLs and exports
//! them as `prompts.txt`. A personal API key in `PROMPTIFY_API_KEY` is picked
//! up before every request; otherwise the shared `GEMINI_API_KEY` is used.

mod config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptify::{
    BatchReport, EnvCredentialStore, GeminiPromptClient, HttpImageProbe, OutcomeKind,
    PromptController, PromptifyError, TracingAlerter, WorkItem,
};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "promptify")]
#[command(about = "Generate AI art prompts from image URLs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate prompts for every URL, one request at a time
    Generate {
        /// Image URLs
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line
        #[arg(long)]
        file: Option<PathBuf>,

        /// Directory for prompts.txt
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Check that every URL serves an image before generating
        #[arg(long)]
        probe: bool,

        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate a prompt for a single image
    Describe {
        url: String,

        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct GenerateResponse {
    success: bool,
    report: BatchReport,
    items: Vec<WorkItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct DescribeResponse {
    success: bool,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn output<T: Serialize>(resp: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(resp)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,promptify=debug,gemini_client=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Generate {
            urls,
            file,
            out,
            probe,
            json,
        } => cmd_generate(&config, urls, file, out, probe, json).await,
        Commands::Describe { url, json } => cmd_describe(&config, &url, json).await,
    }
}

fn build_controller(config: &Config) -> PromptController {
    let client = GeminiPromptClient::new(config.gemini_client());
    PromptController::new(client)
        .with_credentials(EnvCredentialStore)
        .with_alerter(TracingAlerter)
        .with_config(config.controller_config())
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_generate(
    config: &Config,
    urls: Vec<String>,
    file: Option<PathBuf>,
    out: PathBuf,
    probe: bool,
    json: bool,
) -> Result<()> {
    let mut input = urls.join("\n");
    if let Some(path) = &file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL file {}", path.display()))?;
        input.push('\n');
        input.push_str(&contents);
    }

    let controller = build_controller(config);
    match controller.add_urls(&input) {
        Ok(_) => {}
        Err(PromptifyError::EmptyUrl) => bail!("No URLs provided"),
        Err(e) => return Err(e.into()),
    }

    if probe {
        let invalid = controller.validate_images(&HttpImageProbe::new()).await;
        if !invalid.is_empty() {
            tracing::warn!(count = invalid.len(), "Skipping URLs that do not serve an image");
        }
    }

    let mut progress = controller.watch_progress();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let p = *progress.borrow();
            if !p.is_idle() {
                eprintln!("[{}/{}] {}%", p.completed, p.total, p.percent());
            }
        }
    });

    let report = controller.generate_all().await?;
    reporter.abort();

    let export_path = match controller.export_prompts() {
        Ok(file) => {
            std::fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            Some(file.write_to(&out)?)
        }
        Err(PromptifyError::NothingToExport) => None,
        Err(e) => return Err(e.into()),
    };

    let items: Vec<WorkItem> = controller.items().iter().map(|i| (**i).clone()).collect();

    if json {
        return output(&GenerateResponse {
            success: !report.had_errors(),
            report,
            items,
            export_path,
        });
    }

    for item in &items {
        match (&item.prompt, &item.error) {
            (Some(prompt), _) => {
                println!("{}", item.url);
                println!("  {}", prompt);
                if let Some(tags) = &item.tags {
                    println!("  tags: {}", tags.join(", "));
                }
            }
            (None, Some(error)) => println!("{}\n  error: {}", item.url, error),
            (None, None) if !item.is_valid() => println!("{}\n  skipped: image unavailable", item.url),
            (None, None) => println!("{}\n  skipped", item.url),
        }
    }
    println!(
        "\n{} generated, {} failed, {} skipped",
        report.succeeded, report.failed, report.skipped
    );
    if let Some(path) = export_path {
        println!("Prompts written to {}", path.display());
    }

    Ok(())
}

async fn cmd_describe(config: &Config, url: &str, json: bool) -> Result<()> {
    let controller = build_controller(config);
    let id = controller.add_url(url)?;
    let outcome = controller.generate_one(id).await?;

    let response = match outcome.kind {
        OutcomeKind::Succeeded(generated) => DescribeResponse {
            success: true,
            url: url.to_string(),
            prompt: Some(generated.prompt),
            tags: Some(generated.tags),
            error: None,
        },
        OutcomeKind::Failed { detail, .. } => DescribeResponse {
            success: false,
            url: url.to_string(),
            prompt: None,
            tags: None,
            error: Some(detail),
        },
    };

    if json {
        return output(&response);
    }

    match (&response.prompt, &response.error) {
        (Some(prompt), _) => {
            println!("{}", prompt);
            if let Some(tags) = &response.tags {
                println!("\ntags: {}", tags.join(", "));
            }
            Ok(())
        }
        (None, Some(error)) => bail!("{}", error),
        (None, None) => Ok(()),
    }
}
