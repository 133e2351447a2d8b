//! Import the legacy workbook (CSV exports of its `details` and `payment` sheets).
//!
//! ```text
//! import --details exports/ --payments exports/ --owner dency --admin-user dency --admin-pass ...
//! ```

use anyhow::Context;
use clinic_backend::auth::seed_user;
use clinic_backend::config::Config;
use clinic_backend::import::{ImportMode, ImportOptions, Importer};
use clinic_backend::logging;
use clinic_backend::store::schema::bootstrap;
use clinic_backend::store::{Store, UserRepo};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Import legacy patient and payment sheets")]
struct Args {
    /// Database file; defaults to DATABASE_PATH.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Details sheet CSV, or a directory containing `<details-sheet>.csv`.
    #[arg(long)]
    details: Option<PathBuf>,

    /// Payments sheet CSV, or a directory containing `<payments-sheet>.csv`.
    #[arg(long)]
    payments: Option<PathBuf>,

    #[arg(long, default_value = "details")]
    details_sheet: String,

    #[arg(long, default_value = "payment")]
    payments_sheet: String,

    #[arg(long, value_enum, default_value_t = ImportMode::Full)]
    mode: ImportMode,

    /// Owner stamped on every imported record.
    #[arg(long)]
    owner: String,

    /// Login created (or whose password is rotated) before importing.
    #[arg(long, requires = "admin_pass")]
    admin_user: Option<String>,

    #[arg(long, requires = "admin_user")]
    admin_pass: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    logging::init(config.log_file.as_deref()).context("failed to initialize logging")?;

    let path = args.db_path.unwrap_or(config.database_path);
    let store = Store::open(&path, &config.pool)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    bootstrap(&*store.conn()?, &config.legacy_owner).context("schema bootstrap failed")?;

    if let (Some(user), Some(pass)) = (&args.admin_user, &args.admin_pass) {
        seed_user(&UserRepo::new(store.clone()), user, pass).context("failed to seed admin user")?;
    }

    let opts = ImportOptions {
        details: args.details,
        payments: args.payments,
        details_sheet: args.details_sheet,
        payments_sheet: args.payments_sheet,
        mode: args.mode,
        owner: args.owner,
    };
    let report = Importer::new(store).run(&opts).context("import failed")?;
    println!("Import completed: {report}");
    Ok(())
}
