//! Bridge status resolution against the Across deposit tracker.

pub mod corrections;
pub mod fixture;
pub mod http;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::chains::normalize_tx_hash;
use crate::error::Error;
use crate::types::BridgeLookupResult;

pub use corrections::{CorrectionEntry, CorrectionTable};
pub use fixture::FixtureBridgeApi;
pub use http::HttpBridgeApi;

/// `deposits/details` response body. Every field is optional upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositDetails {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "chain_id_from_number_or_string")]
    pub destination_chain_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fill_txs: Vec<FillTx>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FillTx {
    #[serde(default)]
    pub hash: Option<String>,
}

fn chain_id_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid chain id {n}"))),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid chain id {s:?}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid chain id {other}"
        ))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FillTx>, D::Error>
where
    D: Deserializer<'de>,
{
    let fills = Option::<Vec<FillTx>>::deserialize(deserializer)?;
    Ok(fills.unwrap_or_default())
}

impl From<DepositDetails> for BridgeLookupResult {
    fn from(details: DepositDetails) -> Self {
        let fill_tx_hash = details
            .fill_txs
            .into_iter()
            .next()
            .and_then(|fill| fill.hash)
            .map(|hash| normalize_tx_hash(&hash));
        Self {
            status: details.status,
            message: details.message,
            fill_tx_hash,
            destination_chain: details.destination_chain_id,
        }
    }
}

/// What the bridge endpoint answered for one deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeResponse {
    Success(DepositDetails),
    /// Any non-2xx status.
    NonSuccess { status: u16 },
}

/// Query side of the deposit tracker. One request per origin deposit.
pub trait BridgeApi {
    fn deposit_details(
        &self,
        deposit_tx_hash: &str,
        origin_chain_id: u64,
    ) -> Result<BridgeResponse, Error>;
}

impl<T: BridgeApi + ?Sized> BridgeApi for Box<T> {
    fn deposit_details(
        &self,
        deposit_tx_hash: &str,
        origin_chain_id: u64,
    ) -> Result<BridgeResponse, Error> {
        (**self).deposit_details(deposit_tx_hash, origin_chain_id)
    }
}

/// Turns bridge responses into [`BridgeLookupResult`]s without ever failing
/// the batch: non-success answers and transport errors both come back as an
/// unresolved result.
pub struct BridgeResolver<A> {
    api: A,
}

impl<A: BridgeApi> BridgeResolver<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn resolve(&self, origin_tx_hash: &str, origin_chain_id: u64) -> BridgeLookupResult {
        match self.api.deposit_details(origin_tx_hash, origin_chain_id) {
            Ok(BridgeResponse::Success(details)) => {
                let result = BridgeLookupResult::from(details);
                debug!(
                    tx_hash = origin_tx_hash,
                    origin_chain_id,
                    status = ?result.status,
                    fill_tx_hash = ?result.fill_tx_hash,
                    "resolved deposit"
                );
                result
            }
            Ok(BridgeResponse::NonSuccess { status }) => {
                debug!(
                    tx_hash = origin_tx_hash,
                    origin_chain_id, status, "deposit lookup returned non-success"
                );
                BridgeLookupResult::unresolved()
            }
            Err(e) => {
                warn!(
                    tx_hash = origin_tx_hash,
                    origin_chain_id,
                    error = %e,
                    "deposit lookup failed, leaving unresolved"
                );
                BridgeLookupResult::unresolved()
            }
        }
    }
}
