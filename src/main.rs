use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use consent_sync::config::AppConfig;
use consent_sync::privacy::http_client::CodeAssistHttpClient;
use consent_sync::privacy::{ConsentSyncController, SyncStatus};
use consent_sync::{logging, paths, tui};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "consent-sync")]
#[command(about = "Inspect and update Gemini Code Assist data-collection consent")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.consent-sync/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh and print the consent status
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Set the free-tier data-collection opt-in
    Set {
        value: Toggle,
        #[arg(long)]
        json: bool,
    },
    /// Show the privacy notice screen
    Notice,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => paths::config_path()?,
    };
    AppConfig::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

fn print_status(status: &SyncStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }

    let preference = match status.data_collection_opt_in {
        Some(true) => "opted in",
        Some(false) => "opted out",
        None => "unknown",
    };
    println!(
        "Free tier:       {}",
        if status.is_free_tier { "yes" } else { "no" }
    );
    if status.is_free_tier {
        println!("Data collection: {}", preference);
    }
    if let Some(synced) = &status.last_synced_at {
        println!("Last synced:     {}", synced);
    }
    if let Some(error) = &status.error {
        eprintln!("Error: {}", error);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The notice screen owns the terminal, so logs only go to the file.
    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("[consent-sync] Warning: logging disabled: {:#}", e);
    }

    let config = load_config(&cli)?;
    let client = CodeAssistHttpClient::from_config(config)?;
    let controller = Arc::new(ConsentSyncController::new(Arc::new(client)));

    let status = match cli.command {
        Command::Status { json } => {
            controller.initialize().await;
            let status = controller.status();
            print_status(&status, json)?;
            status
        }
        Command::Set { value, json } => {
            controller.initialize().await;
            controller.update_opt_in(value.enabled()).await;
            let status = controller.status();
            print_status(&status, json)?;
            status
        }
        Command::Notice => return tui::run_notice(controller).await,
    };

    if status.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}
