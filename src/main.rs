use agrofin::application::service::FinancingService;
use agrofin::domain::schedule::AmortizationMethod;
use agrofin::domain::workflow::WorkflowTable;
use agrofin::infrastructure::in_memory::{
    InMemoryFinancingStore, InMemoryNotificationStore, InMemoryPaymentStore,
};
#[cfg(feature = "storage-rocksdb")]
use agrofin::infrastructure::rocksdb::RocksDBStore;
use agrofin::interfaces::csv::command_reader::CommandReader;
use agrofin::interfaces::csv::financing_writer::FinancingWriter;
use agrofin::interfaces::csv::schedule_writer::ScheduleWriter;
use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the payment schedule of a loan
    Schedule {
        /// Loan principal
        #[arg(long, allow_hyphen_values = true)]
        principal: Decimal,

        /// Periodic interest rate as a fraction (0.02 = 2% per month)
        #[arg(long, allow_hyphen_values = true)]
        rate: Decimal,

        /// Number of monthly periods
        #[arg(long)]
        months: u32,

        /// Amortization method: french or linear
        #[arg(long, default_value = "french")]
        method: AmortizationMethod,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// List the statuses a role may move a financing to
    Transitions {
        /// Current financing status
        #[arg(long)]
        status: String,

        /// Acting role (admin, operador, productor)
        #[arg(long)]
        role: Option<String>,
    },

    /// Replay a CSV file of create, transition and pay commands
    Process {
        /// Input commands CSV file
        input: PathBuf,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long, env = "AGROFIN_DB_PATH")]
        db_path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Schedule {
            principal,
            rate,
            months,
            method,
            format,
        } => print_schedule(principal, rate, months, method, format),
        Command::Transitions { status, role } => {
            let destinations =
                WorkflowTable::global().allowed_destinations_raw(&status, role.as_deref());
            let mut stdout = io::stdout().lock();
            for destination in destinations {
                writeln!(stdout, "{destination}").into_diagnostic()?;
            }
            Ok(())
        }
        Command::Process { input, db_path } => process(input, db_path).await,
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agrofin=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn print_schedule(
    principal: Decimal,
    rate: Decimal,
    months: u32,
    method: AmortizationMethod,
    format: OutputFormat,
) -> Result<()> {
    let schedule = method.schedule(principal, rate, months);
    let stdout = io::stdout();

    match format {
        OutputFormat::Csv => {
            ScheduleWriter::new(stdout.lock())
                .write_schedule(&schedule)
                .into_diagnostic()?;
            info!(
                %method,
                total_interest = %schedule.total_interest,
                total_paid = %schedule.total_paid,
                monthly_payment = ?schedule.monthly_payment,
                "schedule totals"
            );
        }
        OutputFormat::Json => {
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &schedule).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;
        }
    }
    Ok(())
}

async fn process(input: PathBuf, db_path: Option<PathBuf>) -> Result<()> {
    let service = build_service(db_path)?;

    let file = File::open(input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = service.process_command(command).await {
                    error!("Error processing command: {e}");
                }
            }
            Err(e) => {
                error!("Error reading command: {e}");
            }
        }
    }

    let financings = service.into_results().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = FinancingWriter::new(stdout.lock());
    writer.write_financings(financings).into_diagnostic()?;

    Ok(())
}

fn build_service(db_path: Option<PathBuf>) -> Result<FinancingService> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(path) = db_path {
        let store = RocksDBStore::open(path).into_diagnostic()?;
        return Ok(FinancingService::new(
            Box::new(store.clone()),
            Box::new(store.clone()),
            Box::new(store),
        ));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }

    Ok(FinancingService::new(
        Box::new(InMemoryFinancingStore::new()),
        Box::new(InMemoryPaymentStore::new()),
        Box::new(InMemoryNotificationStore::new()),
    ))
}
