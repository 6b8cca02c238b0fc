mod commands;

use clap::{Parser, Subcommand};
use edlt_core::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Elite Dangerous journal monitor")]
struct Cli {
    /// Database file to use instead of the configured one
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tail the newest journal until Ctrl-C
    Watch {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Ingest a whole journal file from the start
    Replay { path: PathBuf },
    /// Pilot ranks, location and ship
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Profit totals by category
    Profit {
        #[arg(short, long)]
        category: Option<String>,
        /// Use `.` for thousands and `,` for decimals
        #[arg(long)]
        european: bool,
    },
    /// Material inventory with grade capacity
    Materials {
        #[arg(long)]
        over_capacity: bool,
    },
    /// Bodies, stations and signals of the current system
    System,
    /// Every star system visited so far
    Visited,
    /// Commodity purchases and sales
    Trades {
        #[arg(long)]
        european: bool,
    },
    /// Modules of a ship (the current ship by default)
    Modules {
        #[arg(long)]
        ship_id: Option<i64>,
    },
    /// Show or change the persisted configuration
    Config {
        #[arg(long)]
        journal_dir: Option<PathBuf>,
        #[arg(long)]
        database_path: Option<PathBuf>,
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // EDLT_LOG_DIR switches from stderr to a daily rolling file
    if let Ok(dir) = std::env::var("EDLT_LOG_DIR") {
        let appender = tracing_appender::rolling::daily(dir, "edlt.log");
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(appender)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    let cli = Cli::parse();
    let mut config = AppConfig::load();
    if let Some(db) = cli.database {
        config.database_path = db;
    }

    match cli.command {
        Commands::Watch { dir } => commands::watch(config, dir).await,
        Commands::Replay { path } => commands::replay(&config, &path),
        Commands::Status { json } => commands::status(&config, json),
        Commands::Profit {
            category,
            european,
        } => commands::profit(&config, category.as_deref(), european),
        Commands::Materials { over_capacity } => commands::materials(&config, over_capacity),
        Commands::System => commands::system(&config),
        Commands::Visited => commands::visited(&config),
        Commands::Trades { european } => commands::trades(&config, european),
        Commands::Modules { ship_id } => commands::modules(&config, ship_id),
        Commands::Config {
            journal_dir,
            database_path,
            poll_interval_ms,
        } => commands::config(config, journal_dir, database_path, poll_interval_ms),
    }
}
