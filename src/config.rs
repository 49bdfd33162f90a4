use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::chains::{ACROSS_DEPOSIT_DETAILS_URL, ARBITRUM_RPC_URL, Chain, OPTIMISM_RPC_URL};
use crate::error::Error;
use crate::http::RetryPolicy;
use crate::sources::SourceSet;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sources: SourceSet,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory the source exports are read from.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory the ledgers and report are written to.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Chain name (`arbitrum`, `optimism`, ...) to JSON-RPC URL.
    #[serde(default = "default_rpc_endpoints")]
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}
fn default_bridge_url() -> String {
    ACROSS_DEPOSIT_DETAILS_URL.to_string()
}
fn default_rpc_endpoints() -> BTreeMap<String, String> {
    BTreeMap::from([
        (Chain::Arbitrum.to_string(), ARBITRUM_RPC_URL.to_string()),
        (Chain::Optimism.to_string(), OPTIMISM_RPC_URL.to_string()),
    ])
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    500
}
fn default_max_backoff_ms() -> u64 {
    8_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            out_dir: default_out_dir(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: default_bridge_url(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoints: default_rpc_endpoints(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

impl RpcConfig {
    /// Endpoints keyed by chain. Unknown chain names are rejected.
    pub fn chain_endpoints(&self) -> Result<BTreeMap<Chain, String>, Error> {
        self.endpoints
            .iter()
            .map(|(name, url)| {
                let chain =
                    Chain::from_str(name).map_err(|_| Error::UnknownChain { name: name.clone() })?;
                Ok((chain, url.clone()))
            })
            .collect()
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Error> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_gg20_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.bridge.url, ACROSS_DEPOSIT_DETAILS_URL);
        assert_eq!(config.sources, SourceSet::gg20());
        assert_eq!(config.logging.level, "info");
        let endpoints = config.rpc.chain_endpoints().unwrap();
        assert_eq!(
            endpoints.get(&Chain::Arbitrum).map(String::as_str),
            Some(ARBITRUM_RPC_URL)
        );
        assert_eq!(
            endpoints.get(&Chain::Optimism).map(String::as_str),
            Some(OPTIMISM_RPC_URL)
        );
        assert_eq!(config.http.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse(
            r#"
            [paths]
            data_dir = "exports"

            [http]
            timeout_secs = 5
            max_retries = 0

            [rpc.endpoints]
            base = "http://localhost:8545"

            [[sources.wrappers]]
            path = "base_wrapper.csv"
            chain = "base"

            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("exports"));
        assert_eq!(config.paths.out_dir, PathBuf::from("out"));
        assert_eq!(config.http.timeout(), Duration::from_secs(5));
        assert_eq!(config.http.retry_policy().max_retries, 0);
        assert_eq!(config.sources.wrappers.len(), 1);
        assert_eq!(config.sources.wrappers[0].chain, Chain::Base);
        assert!(config.sources.attestations.is_empty());
        assert!(config.logging.json);

        let endpoints = config.rpc.chain_endpoints().unwrap();
        assert_eq!(endpoints.len(), 1);
        assert!(endpoints.contains_key(&Chain::Base));
    }

    #[test]
    fn unknown_rpc_chain_is_rejected() {
        let config = Config::parse("[rpc.endpoints]\npolygon = \"http://x\"\n").unwrap();
        let err = config.rpc.chain_endpoints().unwrap_err();
        assert!(matches!(err, Error::UnknownChain { name } if name == "polygon"));
    }
}
