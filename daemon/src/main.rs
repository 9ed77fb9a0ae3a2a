//! YAM verification service daemon.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use yam_rpc::{init_logging, LogFormat, RpcServer, ServiceConfig};
use yam_store::JsonFileStore;
use yam_verification::RemoteProofVerifier;

#[derive(Parser)]
#[command(name = "yam-daemon", about = "YAM marketplace verification service")]
struct Cli {
    /// Port the HTTP server listens on.
    #[arg(long, env = "YAM_PORT")]
    port: Option<u16>,

    /// Backing file for the verification record store.
    #[arg(long, env = "YAM_STORAGE_FILE")]
    storage_file: Option<PathBuf>,

    /// External proof backend endpoint.
    #[arg(long, env = "YAM_VERIFIER_ENDPOINT")]
    verifier_endpoint: Option<String>,

    /// Publicly reachable URL of this service's /verify endpoint.
    #[arg(long, env = "YAM_CALLBACK_ENDPOINT")]
    callback_endpoint: Option<String>,

    /// Enable OFAC screening.
    #[arg(long, env = "YAM_OFAC")]
    ofac: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "YAM_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "YAM_LOG_FORMAT")]
    log_format: String,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the verification service.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config: Option<ServiceConfig> = match &cli.config {
        Some(path) => Some(
            ServiceConfig::from_toml_file(&path.display().to_string())
                .map_err(|e| anyhow::anyhow!("config file {}: {e}", path.display()))?,
        ),
        None => None,
    };

    let base = file_config.unwrap_or_default();
    let config = ServiceConfig {
        port: cli.port.unwrap_or(base.port),
        storage_file: cli.storage_file.unwrap_or(base.storage_file),
        verifier_endpoint: cli.verifier_endpoint.unwrap_or(base.verifier_endpoint),
        callback_endpoint: cli.callback_endpoint.unwrap_or(base.callback_endpoint),
        ofac: cli.ofac || base.ofac,
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
        ..base
    };

    init_logging(LogFormat::from_config(&config.log_format), &config.log_level);

    match cli.command {
        Command::Serve => {
            tracing::info!(
                "starting verification service (port {}, store {}, verifier {})",
                config.port,
                config.storage_file.display(),
                config.verifier_endpoint,
            );

            let store = Arc::new(JsonFileStore::new(&config.storage_file));
            let verifier = Arc::new(
                RemoteProofVerifier::new(config.verifier_endpoint.clone())
                    .map_err(|e| anyhow::anyhow!("proof verifier: {e}"))?,
            );
            let server = RpcServer::new(config.port, store, verifier);

            tokio::select! {
                result = server.start() => {
                    result.map_err(|e| anyhow::anyhow!("server error: {e}"))?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received, stopping service");
                }
            }

            tracing::info!("yam daemon exited cleanly");
        }
    }

    Ok(())
}
