use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::chains::Chain;
use crate::error::Error;
use crate::http::{RetryPolicy, build_client, send_with_retry};
use crate::rpc::{ChainReceipt, ChainRpc, ChainTransaction};

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Ethereum JSON-RPC over blocking HTTP, one endpoint per chain.
pub struct JsonRpcClient {
    client: Client,
    endpoints: BTreeMap<Chain, String>,
    retry: RetryPolicy,
}

impl JsonRpcClient {
    pub fn new(
        endpoints: BTreeMap<Chain, String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoints,
            retry,
        })
    }

    fn endpoint(&self, chain: Chain) -> Result<&str, Error> {
        self.endpoints
            .get(&chain)
            .map(String::as_str)
            .ok_or_else(|| Error::chain_fetch(format!("no RPC endpoint configured for {chain}")))
    }

    fn call<T: DeserializeOwned>(
        &self,
        chain: Chain,
        method: &str,
        tx_hash: &str,
    ) -> Result<T, Error> {
        let url = self.endpoint(chain)?;
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": [tx_hash],
        });
        debug!(%chain, method, tx_hash, "json-rpc call");

        let response = send_with_retry(&self.retry, method, || self.client.post(url).json(&body))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::chain_fetch(format!(
                "{method} on {chain} returned HTTP {status}"
            )));
        }

        let parsed: JsonRpcResponse<T> = response.json()?;
        if let Some(err) = parsed.error {
            return Err(Error::chain_fetch(format!(
                "{method} on {chain} failed: {} ({})",
                err.message, err.code
            )));
        }
        parsed
            .result
            .ok_or_else(|| Error::chain_fetch(format!("{method}: {tx_hash} not found on {chain}")))
    }
}

impl ChainRpc for JsonRpcClient {
    fn get_transaction(&self, chain: Chain, tx_hash: &str) -> Result<ChainTransaction, Error> {
        self.call(chain, "eth_getTransactionByHash", tx_hash)
    }

    fn get_transaction_receipt(&self, chain: Chain, tx_hash: &str) -> Result<ChainReceipt, Error> {
        self.call(chain, "eth_getTransactionReceipt", tx_hash)
    }
}
