use aqsat_migrate::domain::model::PhaseReport;
use aqsat_migrate::domain::ports::{ConfigProvider, EntityStore, StateStore, WorkbookReader};
use aqsat_migrate::utils::{logger, validation::Validate};
use aqsat_migrate::{
    Cli, Command, FileStateStore, FileWorkbookReader, MigrateConfig, MigrateError,
    MigrationOrchestrator, RestEntityStore, Result,
};
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting aqsat-migrate");

    let config = match MigrateConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let store = RestEntityStore::from_config(&config);
    let state = FileStateStore::new(config.state_file());
    let reader = FileWorkbookReader::new();
    let mut orchestrator = MigrationOrchestrator::new(store, state, reader);

    if let Err(e) = run_command(&mut orchestrator, &cli.command).await {
        tracing::error!("Migration step failed: {}", e);
        eprintln!("❌ {}", e);
        let exit_code = match e {
            MigrateError::Validation { .. }
            | MigrateError::Precondition { .. }
            | MigrateError::MissingConfig { .. }
            | MigrateError::InvalidConfigValue { .. } => 2,
            _ => 1,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run_command<E, S, W>(
    orchestrator: &mut MigrationOrchestrator<E, S, W>,
    command: &Command,
) -> Result<()>
where
    E: EntityStore,
    S: StateStore,
    W: WorkbookReader,
{
    match command {
        Command::Customers { file } => {
            let report = orchestrator.import_customers(require_file(file)?).await?;
            print_report("customers", report);
            println!("   You can now import transactions.");
        }
        Command::Transactions { file } => {
            let report = orchestrator
                .import_transactions(require_file(file)?)
                .await?;
            print_report("transactions", report);
            println!("   You can now import payments.");
        }
        Command::Payments { file } => {
            let report = orchestrator.import_payments(require_file(file)?).await?;
            print_report("payments", report);
            println!("   Migration complete!");
        }
        Command::All {
            customers,
            transactions,
            payments,
        } => {
            print_report(
                "customers",
                orchestrator.import_customers(require_file(customers)?).await?,
            );
            print_report(
                "transactions",
                orchestrator
                    .import_transactions(require_file(transactions)?)
                    .await?,
            );
            print_report(
                "payments",
                orchestrator.import_payments(require_file(payments)?).await?,
            );
            println!("   Migration complete!");
        }
        Command::Clear => {
            orchestrator.clear_state()?;
            println!("✅ Cleared persisted legacy-id maps.");
        }
        Command::Status => {
            println!("Migration phase: {}", orchestrator.phase()?);
        }
    }
    Ok(())
}

fn require_file(path: &Path) -> Result<&Path> {
    if !path.exists() {
        return Err(MigrateError::validation(format!(
            "file not found: {}",
            path.display()
        )));
    }
    Ok(path)
}

fn print_report(phase: &str, report: PhaseReport) {
    if report.skipped > 0 {
        println!(
            "✅ Imported {} {} ({} rows skipped).",
            report.inserted, phase, report.skipped
        );
    } else {
        println!("✅ Imported {} {}.", report.inserted, phase);
    }
}
