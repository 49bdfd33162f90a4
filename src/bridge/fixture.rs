use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::bridge::{BridgeApi, BridgeResponse, DepositDetails};
use crate::chains::normalize_tx_hash;
use crate::error::Error;

/// One recorded exchange with the deposit tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedDeposit {
    pub deposit_tx_hash: String,
    pub origin_chain_id: u64,
    #[serde(default = "default_http_status")]
    pub http_status: u16,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

fn default_http_status() -> u16 {
    200
}

/// Replays recorded responses. Unknown deposits answer 404.
#[derive(Debug, Clone, Default)]
pub struct FixtureBridgeApi {
    responses: HashMap<(String, u64), BridgeResponse>,
}

impl FixtureBridgeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_details(
        mut self,
        deposit_tx_hash: &str,
        origin_chain_id: u64,
        details: DepositDetails,
    ) -> Self {
        self.responses.insert(
            (normalize_tx_hash(deposit_tx_hash), origin_chain_id),
            BridgeResponse::Success(details),
        );
        self
    }

    pub fn with_status(mut self, deposit_tx_hash: &str, origin_chain_id: u64, status: u16) -> Self {
        self.responses.insert(
            (normalize_tx_hash(deposit_tx_hash), origin_chain_id),
            BridgeResponse::NonSuccess { status },
        );
        self
    }

    pub fn from_recorded(recorded: Vec<RecordedDeposit>) -> Result<Self, Error> {
        let mut api = Self::new();
        for entry in recorded {
            api = if (200..300).contains(&entry.http_status) {
                let details: DepositDetails = match entry.body {
                    Some(body) => serde_json::from_value(body)?,
                    None => DepositDetails::default(),
                };
                api.with_details(&entry.deposit_tx_hash, entry.origin_chain_id, details)
            } else {
                api.with_status(
                    &entry.deposit_tx_hash,
                    entry.origin_chain_id,
                    entry.http_status,
                )
            };
        }
        Ok(api)
    }

    /// Loads a JSON array of [`RecordedDeposit`].
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path)?;
        let recorded: Vec<RecordedDeposit> = serde_json::from_str(&data)?;
        Self::from_recorded(recorded)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl BridgeApi for FixtureBridgeApi {
    fn deposit_details(
        &self,
        deposit_tx_hash: &str,
        origin_chain_id: u64,
    ) -> Result<BridgeResponse, Error> {
        Ok(self
            .responses
            .get(&(normalize_tx_hash(deposit_tx_hash), origin_chain_id))
            .cloned()
            .unwrap_or(BridgeResponse::NonSuccess { status: 404 }))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn recorded_entries_replay_by_hash_and_chain() {
        let recorded: Vec<RecordedDeposit> = serde_json::from_value(serde_json::json!([
            {
                "deposit_tx_hash": "0xABC",
                "origin_chain_id": 10,
                "body": { "status": "filled", "fillTxs": [{ "hash": "0xdef" }] }
            },
            { "deposit_tx_hash": "0x404", "origin_chain_id": 1, "http_status": 500 }
        ]))
        .unwrap();
        let api = FixtureBridgeApi::from_recorded(recorded).unwrap();
        assert_eq!(api.len(), 2);

        let Ok(BridgeResponse::Success(details)) = api.deposit_details("0xabc", 10) else {
            unreachable!("expected recorded success");
        };
        assert_eq!(details.status.as_deref(), Some("filled"));

        assert_eq!(
            api.deposit_details("0xabc", 42161).unwrap(),
            BridgeResponse::NonSuccess { status: 404 }
        );
        assert_eq!(
            api.deposit_details("0x404", 1).unwrap(),
            BridgeResponse::NonSuccess { status: 500 }
        );
    }
}
