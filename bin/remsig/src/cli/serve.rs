use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
};

use clap::Parser;
use remsig_keystore::KeyRegistry;
use remsig_network_spec::ChainSpec;
use remsig_server::{router, serve, AppState};
use remsig_slashing::SqliteStore;
use tracing::info;

#[derive(Debug, Parser)]
pub struct ServeCommand {
    /// Port to listen on
    #[arg(long, default_value_t = 8080, env = "HTTP_PORT")]
    pub port: u16,

    /// Route prefix for the HTTP API, e.g. /api/v1
    #[arg(long, default_value = "", env = "HTTP_API_PREFIX")]
    pub api_prefix: String,

    /// Path to the slashing-protection database
    #[arg(long, default_value = "remsig.db", env = "DATABASE_PATH")]
    pub db_path: PathBuf,

    /// Directory holding validator keystores and key configs
    #[arg(long, env = "VALIDATORS_KEYSTORE_PATH")]
    pub keystore_path: PathBuf,

    /// Directory holding keystore password files
    #[arg(long, env = "VALIDATORS_KEYSTORE_PASSWORD_PATH")]
    pub keystore_password_path: PathBuf,

    /// Network to sign for: mainnet | hoodi | custom
    #[arg(long, default_value = "mainnet", env = "NETWORK_CHAIN")]
    pub chain: String,

    /// Spec file to use when --chain is custom
    #[arg(long, env = "NETWORK_CONFIG_SPEC")]
    pub chain_spec_path: Option<PathBuf>,
}

pub fn run(cmd: ServeCommand) -> anyhow::Result<()> {
    let spec = ChainSpec::load(&cmd.chain, cmd.chain_spec_path.as_deref())?;

    let store = SqliteStore::open(&cmd.db_path)?;
    info!(path = %cmd.db_path.display(), "slashing-protection database opened");

    let registry = KeyRegistry::load(&cmd.keystore_path, &cmd.keystore_password_path)?;
    info!(count = registry.len(), "validator keys loaded");

    let state = Arc::new(AppState {
        registry,
        store: Arc::new(store),
        spec,
    });
    let app = router(state, &cmd.api_prefix);
    let address = SocketAddr::from(([0, 0, 0, 0], cmd.port));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(address, app))?;

    info!("server stopped");
    Ok(())
}
