use std::time::Duration;

use reqwest::blocking::Client;

use crate::bridge::{BridgeApi, BridgeResponse, DepositDetails};
use crate::error::Error;
use crate::http::{RetryPolicy, build_client, send_with_retry};

/// Live client for the Across `deposits/details` endpoint.
pub struct HttpBridgeApi {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpBridgeApi {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
            retry,
        })
    }
}

impl BridgeApi for HttpBridgeApi {
    fn deposit_details(
        &self,
        deposit_tx_hash: &str,
        origin_chain_id: u64,
    ) -> Result<BridgeResponse, Error> {
        let origin_chain_id = origin_chain_id.to_string();
        let response = send_with_retry(&self.retry, "across deposits/details", || {
            self.client.get(&self.url).query(&[
                ("depositTxHash", deposit_tx_hash),
                ("originChainId", origin_chain_id.as_str()),
            ])
        })?;

        let status = response.status();
        if !status.is_success() {
            return Ok(BridgeResponse::NonSuccess {
                status: status.as_u16(),
            });
        }
        let details: DepositDetails = response.json()?;
        Ok(BridgeResponse::Success(details))
    }
}
