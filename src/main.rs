use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use gg20_reconcile::bridge::BridgeApi;
use gg20_reconcile::config::Config;
use gg20_reconcile::report::{LedgerSummaries, write_outputs};
use gg20_reconcile::rpc::ChainRpc;
use gg20_reconcile::{
    FixtureBridgeApi, FixtureChainRpc, HttpBridgeApi, JsonRpcClient, Reconciler, load_inputs,
};
use tracing::info;

/// Reconciles GG20 donation exports into a single ledger.
#[derive(Debug, Parser)]
#[command(name = "gg20-reconcile", version, about)]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the CSV exports.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the ledgers and report are written to.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Answer bridge lookups from a recorded JSON file instead of the live API.
    #[arg(long)]
    bridge_fixture: Option<PathBuf>,

    /// Answer chain RPC calls from a recorded JSON file instead of live endpoints.
    #[arg(long)]
    rpc_fixture: Option<PathBuf>,
}

fn init_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn bridge_api(config: &Config, fixture: Option<&Path>) -> anyhow::Result<Box<dyn BridgeApi>> {
    if let Some(path) = fixture {
        let api = FixtureBridgeApi::from_path(path)
            .with_context(|| format!("loading bridge fixture {}", path.display()))?;
        info!(path = %path.display(), deposits = api.len(), "using recorded bridge responses");
        return Ok(Box::new(api));
    }
    let api = HttpBridgeApi::new(
        config.bridge.url.clone(),
        config.http.timeout(),
        config.http.retry_policy(),
    )?;
    Ok(Box::new(api))
}

fn chain_rpc(config: &Config, fixture: Option<&Path>) -> anyhow::Result<Box<dyn ChainRpc>> {
    if let Some(path) = fixture {
        let rpc = FixtureChainRpc::from_path(path)
            .with_context(|| format!("loading rpc fixture {}", path.display()))?;
        info!(path = %path.display(), transactions = rpc.len(), "using recorded chain data");
        return Ok(Box::new(rpc));
    }
    let endpoints = config
        .rpc
        .chain_endpoints()
        .context("invalid [rpc.endpoints]")?;
    let rpc = JsonRpcClient::new(endpoints, config.http.timeout(), config.http.retry_policy())?;
    Ok(Box::new(rpc))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.paths.data_dir = data_dir;
    }
    if let Some(out_dir) = cli.out_dir {
        config.paths.out_dir = out_dir;
    }

    init_logging(&config);
    info!("gg20-reconcile v{} starting", env!("CARGO_PKG_VERSION"));

    let inputs = load_inputs(&config.sources, &config.paths.data_dir)
        .with_context(|| format!("loading exports from {}", config.paths.data_dir.display()))?;

    let bridge = bridge_api(&config, cli.bridge_fixture.as_deref())?;
    let rpc = chain_rpc(&config, cli.rpc_fixture.as_deref())?;
    let reconciliation = Reconciler::new(bridge, rpc).run(&inputs);

    write_outputs(&config.paths.out_dir, &reconciliation)
        .with_context(|| format!("writing outputs to {}", config.paths.out_dir.display()))?;

    let summaries = LedgerSummaries::from_reconciliation(&reconciliation);
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", reconciliation.report)?;
    writeln!(stdout)?;
    write!(stdout, "{summaries}")?;
    Ok(())
}
