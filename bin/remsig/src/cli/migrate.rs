use std::path::PathBuf;

use clap::Parser;
use remsig_slashing::SqliteStore;
use tracing::info;

#[derive(Debug, Parser)]
pub struct MigrateCommand {
    /// Path to the slashing-protection database
    #[arg(long, default_value = "remsig.db", env = "DATABASE_PATH")]
    pub db_path: PathBuf,
}

pub fn run(cmd: MigrateCommand) -> anyhow::Result<()> {
    SqliteStore::open(&cmd.db_path)?;
    info!(path = %cmd.db_path.display(), "slashing-protection schema applied");
    Ok(())
}
