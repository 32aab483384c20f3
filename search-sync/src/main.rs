use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use search_sync::{AppError, Dependencies, SyncConfig};
use search_sync_pipeline::ImportOptions;
use search_sync_repository::ImportAction;

#[derive(Parser)]
#[command(name = "search-sync")]
#[command(about = "Keep search engine collections in sync with the system of record", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete and recreate collections
    Create {
        /// Collections to recreate, comma separated (default: all)
        #[arg(long, value_delimiter = ',')]
        collections: Vec<String>,
    },
    /// Import every record into collections
    Import {
        /// Collections to import, comma separated (default: all)
        #[arg(long, value_delimiter = ',')]
        collections: Vec<String>,

        /// Records per batch (default: IMPORT_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<usize>,

        /// First page to import, 1-based
        #[arg(long, default_value = "1")]
        first_page: usize,

        /// Last page to import, inclusive
        #[arg(long)]
        last_page: Option<usize>,

        /// Import action (create|upsert|update)
        #[arg(long, default_value = "upsert")]
        action: ImportAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

fn selection(collections: &[String]) -> Option<&[String]> {
    if collections.is_empty() {
        None
    } else {
        Some(collections)
    }
}

async fn run(cli: Cli) -> Result<bool, AppError> {
    let config = SyncConfig::from_env()?;
    let dependencies = Dependencies::new(&config).await?;
    let service = &dependencies.service;

    match cli.command {
        Commands::Create { collections } => {
            let outcomes = service.create_collections(selection(&collections)).await;
            let mut ok = true;
            for outcome in outcomes {
                match &outcome.result {
                    Ok(()) => println!(
                        "{}: created {}",
                        outcome.name,
                        outcome.index_name.as_deref().unwrap_or("-")
                    ),
                    Err(e) => {
                        ok = false;
                        println!("{}: {} failed: {}", outcome.name, outcome.step, e);
                    }
                }
            }
            Ok(ok)
        }
        Commands::Import {
            collections,
            page_size,
            first_page,
            last_page,
            action,
        } => {
            let page_size = page_size.unwrap_or(config.import_page_size);
            if page_size > config.max_batch_size {
                return Err(AppError::config(format!(
                    "page size {} exceeds MAX_BATCH_SIZE ({})",
                    page_size, config.max_batch_size
                )));
            }

            let options = ImportOptions {
                page_size,
                first_page,
                last_page,
                action,
            };

            let results = service
                .import_collections(selection(&collections), &options)
                .await;
            let mut ok = true;
            for (name, result) in results {
                match result {
                    Ok(imported) => {
                        println!(
                            "{}: {} imported, {} failed",
                            name,
                            imported.succeeded,
                            imported.failed()
                        );
                        for failure in &imported.failures {
                            println!("  {}", failure);
                        }
                        ok &= imported.is_success();
                    }
                    Err(e) => {
                        ok = false;
                        println!("{}: import failed: {}", name, e);
                    }
                }
            }
            Ok(ok)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    info!("Starting search sync");

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Search sync failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
