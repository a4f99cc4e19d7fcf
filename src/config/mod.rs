pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{MigrateError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use self::toml_config::TomlConfig;

pub const DEFAULT_STATE_FILE: &str = ".aqsat-migrate/state.json";

#[derive(Debug, Clone, Parser)]
#[command(name = "aqsat-migrate")]
#[command(about = "Migrate a legacy installment ledger from spreadsheet workbooks into the hosted store")]
pub struct Cli {
    /// Optional TOML config file; CLI flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the data store (e.g. https://xyz.supabase.co)
    #[arg(long, global = true)]
    pub store_url: Option<String>,

    /// API key used for both the apikey header and bearer auth
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Where the legacy-id maps are persisted between sessions
    #[arg(long, global = true)]
    pub state_file: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Phase 1: import the customers workbook
    Customers {
        #[arg(long)]
        file: PathBuf,
    },
    /// Phase 2: import the transactions workbook (requires phase 1)
    Transactions {
        #[arg(long)]
        file: PathBuf,
    },
    /// Phase 3: import the payments workbook (requires phase 2)
    Payments {
        #[arg(long)]
        file: PathBuf,
    },
    /// Run all three phases in sequence
    All {
        #[arg(long)]
        customers: PathBuf,
        #[arg(long)]
        transactions: PathBuf,
        #[arg(long)]
        payments: PathBuf,
    },
    /// Discard the persisted legacy-id maps so a fresh run can start
    Clear,
    /// Show the current migration phase
    Status,
}

/// Fully resolved configuration: CLI flags win over the TOML file, which
/// wins over `AQSAT_STORE_URL` / `AQSAT_API_KEY` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateConfig {
    pub store_url: String,
    pub api_key: String,
    pub state_file: String,
}

impl MigrateConfig {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };

        let store_url = cli
            .store_url
            .clone()
            .or_else(|| file.as_ref().map(|f| f.store.url.clone()))
            .or_else(|| std::env::var("AQSAT_STORE_URL").ok())
            .ok_or_else(|| MigrateError::MissingConfig {
                field: "store_url".to_string(),
            })?;

        let api_key = cli
            .api_key
            .clone()
            .or_else(|| file.as_ref().map(|f| f.store.api_key.clone()))
            .or_else(|| std::env::var("AQSAT_API_KEY").ok())
            .ok_or_else(|| MigrateError::MissingConfig {
                field: "api_key".to_string(),
            })?;

        let state_file = cli
            .state_file
            .clone()
            .or_else(|| {
                file.as_ref()
                    .and_then(|f| f.state.as_ref())
                    .map(|s| s.file.clone())
            })
            .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());

        Ok(Self {
            store_url,
            api_key,
            state_file,
        })
    }
}

impl ConfigProvider for MigrateConfig {
    fn store_url(&self) -> &str {
        &self.store_url
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn state_file(&self) -> &str {
        &self.state_file
    }
}

impl Validate for MigrateConfig {
    fn validate(&self) -> Result<()> {
        validate_url("store_url", &self.store_url)?;
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_path("state_file", &self.state_file)?;
        Ok(())
    }
}
