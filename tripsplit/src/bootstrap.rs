use crate::command::Cli;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tripsplit_application::{TripError, TripService};
use tripsplit_infrastructure::JsonFileTripRepository;

pub const STORE_VAR: &str = "TRIPSPLIT_STORE";
pub const DEFAULT_STORE: &str = "tripsplit.json";

/// Application configuration
#[derive(Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub store_path: PathBuf,
}

impl From<&Cli> for AppConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            store_path: cli.store.clone(),
        }
    }
}

/// Parses the command line after loading `.env`, so `TRIPSPLIT_STORE` can
/// come from either place. Usage errors exit here with clap's status code.
pub fn parse_cli() -> Cli {
    let _ = dotenvy::dotenv();
    Cli::parse()
}

/// Wires the trip service to the JSON store named by the config.
pub struct AppBuilder;

impl AppBuilder {
    pub fn build(config: &AppConfig) -> Result<TripService<JsonFileTripRepository>, TripError> {
        let repository = JsonFileTripRepository::new(&config.store_path);
        TripService::load(repository)
    }
}

/// Logs go to stderr so command output stays pipeable. `RUST_LOG` overrides
/// the `warn` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
