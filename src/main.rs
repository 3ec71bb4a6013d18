//! Quotebook - Quote catalog with categories, import/export and remote sync

use anyhow::Result;
use clap::{Parser, Subcommand};
use quotebook::{
    api,
    config::QuotebookConfig,
    error::Error,
    storage::Commit,
    sync::SyncOutcome,
    transfer::EXPORT_FILE_NAME,
    QuoteApp, SessionScope,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(version)]
#[command(about = "Quote catalog with categories, JSON import/export and remote sync")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "QUOTEBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Catalog(CatalogCommand),

    /// Serve the HTTP API with periodic sync
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Disable the sync poller
        #[arg(long)]
        no_sync: bool,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

/// Commands that run once against the stored catalog
#[derive(Subcommand)]
enum CatalogCommand {
    /// List quotes
    List {
        /// Only quotes in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// List categories
    Categories,

    /// Add a quote
    Add {
        /// Quote text
        #[arg(short, long)]
        text: String,

        /// Quote category
        #[arg(short = 'g', long)]
        category: String,
    },

    /// Show a random quote
    Random {
        /// Category to draw from (defaults to the last one used)
        #[arg(long)]
        category: Option<String>,
    },

    /// Export the catalog as JSON
    Export {
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import quotes from a JSON file
    Import {
        /// File to import (must end in .json)
        file: PathBuf,
    },

    /// Sync with the remote endpoint
    Sync {
        /// Push every local quote before pulling
        #[arg(long)]
        push_all: bool,
    },

    /// Inspect or clear the session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Forget stored quotes and the session
    Reset,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Show the remembered category and quote
    Show,
    /// Forget them
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("quotebook={},tower_http=info", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Load configuration
    let config = match cli.config.or_else(|| {
        QuotebookConfig::default_path().filter(|p| p.exists())
    }) {
        Some(path) => QuotebookConfig::from_file(&path)?,
        None => QuotebookConfig::default(),
    };

    match cli.command {
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
        Commands::Serve {
            host,
            port,
            no_sync,
        } => {
            let host = host.unwrap_or_else(|| config.api.host.clone());
            let port = port.unwrap_or(config.api.port);
            run_server(config, host, port, !no_sync).await?;
        }
        Commands::Catalog(command) => {
            let app = QuoteApp::from_config(&config, SessionScope::Persistent).await?;
            run_command(&app, command).await?;
            app.flush_pushes().await;
        }
    }

    Ok(())
}

async fn run_command(app: &QuoteApp, command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::List { category } => {
            for quote in app.quotes_in(category.as_deref()).await {
                println!("[{}] {}", quote.category, quote.text);
            }
        }
        CatalogCommand::Categories => {
            for category in app.categories().await {
                println!("{}", category);
            }
        }
        CatalogCommand::Add { text, category } => match app.add_quote(&text, &category).await {
            Ok(commit) => {
                if commit.outcome.is_new {
                    println!("Added quote to {}", commit.outcome.quote.category);
                } else {
                    println!("Quote already in catalog");
                }
                report_storage(&commit);
            }
            Err(e @ Error::Validation { .. }) => println!("{}", e),
            Err(e) => return Err(e.into()),
        },
        CatalogCommand::Random { category } => match app.random_quote(category.as_deref()).await {
            Ok(quote) => println!("{}\n  ({})", quote.text, quote.category),
            Err(Error::EmptyCategory(category)) if category.is_empty() => {
                println!("No quotes available.");
            }
            Err(Error::EmptyCategory(category)) => {
                println!("No quotes found for category '{}'.", category);
            }
            Err(e) => return Err(e.into()),
        },
        CatalogCommand::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            app.export_to(&path).await?;
            println!("Exported {} quotes to {}", app.catalog().await.len(), path.display());
        }
        CatalogCommand::Import { file } => match app.import_file(&file).await {
            Ok(commit) => {
                println!(
                    "Quotes imported: {} added, {} duplicates, {} invalid",
                    commit.outcome.added, commit.outcome.duplicates, commit.outcome.rejected
                );
                report_storage(&commit);
            }
            Err(e @ (Error::Import(_) | Error::Format(_))) => println!("{}", e),
            Err(e) => return Err(e.into()),
        },
        CatalogCommand::Sync { push_all } => match app.sync_now(push_all).await {
            SyncOutcome::Merged {
                pulled,
                report,
                storage_error,
            } => {
                println!(
                    "Quotes synced with server: {} pulled, {} new",
                    pulled, report.added
                );
                if let Some(err) = storage_error {
                    println!("Warning: changes not saved: {}", err);
                }
            }
            SyncOutcome::Skipped => println!("A sync is already running."),
            SyncOutcome::Failed { error } => println!("Error syncing quotes: {}", error),
        },
        CatalogCommand::Session { action } => match action {
            SessionAction::Show => {
                let session = app.session().await;
                println!(
                    "Last category: {}",
                    session.category.as_deref().unwrap_or("(none)")
                );
                println!(
                    "Last quote:    {}",
                    session.quote.as_deref().unwrap_or("(none)")
                );
            }
            SessionAction::Clear => {
                app.clear_session().await;
                println!("Session cleared.");
            }
        },
        CatalogCommand::Reset => {
            let catalog = app.reset().await?;
            println!("Catalog reset to {} default quotes.", catalog.len());
        }
    }
    Ok(())
}

fn report_storage<T>(commit: &Commit<T>) {
    if let Some(err) = &commit.storage_error {
        println!("Warning: changes not saved: {}", err);
    }
}

async fn run_server(config: QuotebookConfig, host: String, port: u16, sync_enabled: bool) -> Result<()> {
    tracing::info!("Starting Quotebook API");

    let app = Arc::new(QuoteApp::from_config(&config, SessionScope::Process).await?);
    let router = api::build_app(app.clone(), &config.api.cors_origins);

    let poller = (sync_enabled && config.sync.enabled).then(|| app.start_poller());

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "Quotebook API is running. Press Ctrl+C to stop.");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Shutting down...");
    if let Some(poller) = poller {
        poller.stop();
    }
    app.flush_pushes().await;

    Ok(())
}

fn show_config(config: Option<&QuotebookConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_catalog_commands_parse_at_top_level() {
        let cli = Cli::try_parse_from(["quotebook", "add", "--text", "Ship it.", "-g", "Work"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Catalog(CatalogCommand::Add { ref text, ref category })
                if text == "Ship it." && category == "Work"
        ));

        let cli = Cli::try_parse_from(["quotebook", "session", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Catalog(CatalogCommand::Session { action: SessionAction::Clear })
        ));
    }

    #[test]
    fn test_serve_and_config_parse_separately() {
        let cli = Cli::try_parse_from(["quotebook", "serve", "--port", "9000", "--no-sync"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve { port: Some(9000), no_sync: true, .. }
        ));

        let cli = Cli::try_parse_from(["quotebook", "config", "--default"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { default: true }));
    }
}
