use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use merge_ledger::archive::PayloadArchive;
use merge_ledger::config::Config;
use merge_ledger::github::FileLister;
use merge_ledger::processor::Processor;
use merge_ledger::replay::replay_file;
use merge_ledger::server::{AppState, LiveProcessor, build_router};
use merge_ledger::store::RecordStore;
use merge_ledger::summarizer::Summarizer;

#[derive(Parser)]
#[command(name = "merge-ledger", about = "Records PRs merged to trunk")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server.
    Serve,
    /// Process a saved webhook payload file.
    Replay {
        /// Path to the payload JSON file.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "merge_ledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let processor = build_processor(&config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app_state = AppState::new(
                processor,
                config.webhook_secret.map(String::into_bytes),
            );
            let app = build_router(app_state);

            info!("listening on {}", config.listen_addr);
            let listener = tokio::net::TcpListener::bind(config.listen_addr)
                .await
                .unwrap();
            axum::serve(listener, app).await.unwrap();
        }
        Command::Replay { path } => match replay_file(&processor, &path).await {
            Ok(outcome) => {
                println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
            }
            Err(err) => {
                error!(error = %err, path = %path.display(), "replay failed");
                std::process::exit(1);
            }
        },
    }
}

/// Wires the processor's capabilities from configuration.
fn build_processor(config: &Config) -> LiveProcessor {
    let files = FileLister::from_token(config.github_token.as_deref());
    let summarizer = Summarizer::from_credentials(
        config.openai_api_key.as_deref(),
        &config.openai_model,
        &config.openai_api_base,
    );
    let store = RecordStore::from_credentials(
        config.supabase_url.as_deref(),
        config.supabase_key.as_deref(),
    );

    let mut processor = Processor::new(files, summarizer, store, config.tracked.clone());

    if config.save_payloads {
        match PayloadArchive::new(&config.payload_dir) {
            Ok(archive) => processor = processor.with_archive(archive),
            Err(err) => {
                warn!(error = %err, dir = %config.payload_dir.display(), "payload archiving disabled");
            }
        }
    }

    processor
}
