//! Bring the database schema up to date without starting the server.

use anyhow::Context;
use clinic_backend::config::Config;
use clinic_backend::logging;
use clinic_backend::store::schema::bootstrap;
use clinic_backend::store::Store;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Create or migrate the clinic database schema")]
struct Args {
    /// Database file; defaults to DATABASE_PATH.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Owner stamped on rows that predate ownership; defaults to LEGACY_OWNER.
    #[arg(long)]
    legacy_owner: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    logging::init(config.log_file.as_deref()).context("failed to initialize logging")?;

    let path = args.db_path.unwrap_or(config.database_path);
    let owner = args.legacy_owner.unwrap_or(config.legacy_owner);
    let store = Store::open(&path, &config.pool)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    bootstrap(&*store.conn()?, &owner).context("schema bootstrap failed")?;
    log::info!("schema of {} is up to date", path.display());
    Ok(())
}
