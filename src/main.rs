use larder::{
    batch::BatchDriver,
    config::{
        DbConfig, FailurePolicy, PipelineConfig, DEFAULT_DATA_ROOT, DEFAULT_DB_HOST, DEFAULT_DB_PORT,
    },
    logging,
    store::Store,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(version, about = "Load ingredient and inventory snapshot CSV drops into the warehouse")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Directory holding inbox/, processed/ and rejects/
    #[arg(long, env = "LARDER_DATA_ROOT", default_value = DEFAULT_DATA_ROOT)]
    data_root: PathBuf,

    /// What to do with the rest of the batch after a file is rejected (halt or continue)
    #[arg(long, env = "LARDER_ON_ERROR", default_value = "halt")]
    on_error: FailurePolicy,

    /// Use a SQLite database file instead of PostgreSQL
    #[arg(long, env = "LARDER_SQLITE")]
    sqlite: Option<PathBuf>,

    #[arg(long, env = "DB_HOST", default_value = DEFAULT_DB_HOST)]
    db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = DEFAULT_DB_PORT)]
    db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "")]
    db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    db_password: String,

    #[arg(long, env = "DB_NAME", default_value = "")]
    db_name: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Mode {
    /// Load inbox/ingredients.csv
    Ingredients,
    /// Load every inbox/inventory_snapshot_*.csv in name order
    Inventory,
    /// Ingredients, then inventory snapshots
    All,
}

impl Cli {
    fn db_config(&self) -> DbConfig {
        DbConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    logging::init(if cli.verbose { Level::DEBUG } else { Level::INFO })?;

    let store = match &cli.sqlite {
        Some(path) => Store::open_sqlite(path)
            .await
            .with_context(|| format!("Failed to open sqlite store {}", path.display()))?,
        None => {
            let db = cli.db_config();
            db.validate()?;
            Store::connect(&db)
                .await
                .with_context(|| format!("Failed to connect to {}:{}", db.host, db.port))?
        }
    };

    let config = PipelineConfig::new(&cli.data_root).with_policy(cli.on_error);
    info!(data_root = %config.data_root.display(), policy = %config.policy, mode = ?cli.mode, "Starting load");

    let driver = BatchDriver::new(store, config);
    let result = match cli.mode {
        Mode::Ingredients => driver.run_ingredients().await,
        Mode::Inventory => driver.run_inventory().await,
        Mode::All => driver.run_all().await,
    };
    driver.store().close().await;

    let report = result?;
    info!(
        processed = report.processed(),
        rejected = report.rejected(),
        "Done"
    );

    Ok(())
}
