use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elysia_library::config::AppConfig;
use elysia_library::generation::GeminiClient;
use elysia_library::library::{Library, LibraryState};
use elysia_library::session::{read_stdin_line, Session, StdinConfirm};
use elysia_library::tree::{render_tree, seed};

#[derive(Parser)]
#[command(name = "elysia")]
#[command(about = "A library of knowledge for E.L.Y.S.I.A. to learn from")]
struct Cli {
    /// Path to a JSON config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the generation model
    #[arg(long, global = true)]
    model: Option<String>,

    /// Override the simulated integration delay
    #[arg(long, global = true)]
    integration_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Session,
    /// Print the starting tree and exit
    Tree,
    /// Write the starting tree and an empty chronicle to a JSON file
    Export {
        /// Output path (defaults to the configured export file)
        path: Option<PathBuf>,
    },
}

/// Initialize tracing with output to stderr so stdout stays clean for the session.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "elysia_library=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; the API key may already be in the environment
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let mut config = AppConfig::load(cli.config.as_deref());
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(delay) = cli.integration_delay_ms {
        config.integration_delay_ms = delay;
    }

    let client = GeminiClient::new(
        &config.api_base_url,
        GeminiClient::api_key_from_env(),
        config.request_timeout(),
    )
    .context("Failed to create the generation client")?;
    if !client.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set; reflection cycles will fail");
    }

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Session => {
            tracing::info!(model = %config.model, "Starting session");
            let library = Library::new(LibraryState::default(), client, &config);
            let mut session = Session::new(library, StdinConfirm, &config);
            session.run(read_stdin_line, std::io::stdout()).await?;
        }
        Commands::Tree => {
            let tree = seed::initial_tree();
            print!("{}", render_tree(tree.roots(), &Default::default()));
        }
        Commands::Export { path } => {
            let path = path.unwrap_or_else(|| config.export_file.clone());
            let mut library = Library::new(LibraryState::default(), client, &config);
            let written = library.export(&path)?;
            println!("{}", written.display());
            if let Some(status) = library.state().status(Instant::now()) {
                println!("{}", status);
            }
        }
    }

    Ok(())
}
