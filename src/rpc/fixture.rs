use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::chains::{Chain, normalize_tx_hash};
use crate::error::Error;
use crate::rpc::{ChainReceipt, ChainRpc, ChainTransaction};

/// Recorded `eth_getTransactionByHash` / `eth_getTransactionReceipt` results
/// of one chain, keyed by transaction hash.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordedChain {
    #[serde(default)]
    pub transactions: HashMap<String, ChainTransaction>,
    #[serde(default)]
    pub receipts: HashMap<String, ChainReceipt>,
}

/// Recorded results keyed by chain name (`arbitrum`, `optimism`, ...).
pub type RecordedChainData = BTreeMap<String, RecordedChain>;

type Key = (Chain, String);

/// Replays recorded RPC results; a hash not recorded for the asked chain is
/// a fetch error.
#[derive(Debug, Clone, Default)]
pub struct FixtureChainRpc {
    transactions: HashMap<Key, ChainTransaction>,
    receipts: HashMap<Key, ChainReceipt>,
}

impl FixtureChainRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_recorded(recorded: RecordedChainData) -> Result<Self, Error> {
        let mut rpc = Self::new();
        for (name, data) in recorded {
            let chain = Chain::from_str(&name).map_err(|_| Error::UnknownChain { name })?;
            for (hash, tx) in data.transactions {
                let key = (chain, normalize_tx_hash(&hash));
                rpc.transactions.insert(key, tx);
            }
            for (hash, receipt) in data.receipts {
                let key = (chain, normalize_tx_hash(&hash));
                rpc.receipts.insert(key, receipt);
            }
        }
        Ok(rpc)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path)?;
        let recorded: RecordedChainData = serde_json::from_str(&data)?;
        Self::from_recorded(recorded)
    }

    pub fn with_transaction(
        mut self,
        chain: Chain,
        tx_hash: &str,
        transaction: ChainTransaction,
        receipt: ChainReceipt,
    ) -> Self {
        let key = (chain, normalize_tx_hash(tx_hash));
        self.transactions.insert(key.clone(), transaction);
        self.receipts.insert(key, receipt);
        self
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl ChainRpc for FixtureChainRpc {
    fn get_transaction(&self, chain: Chain, tx_hash: &str) -> Result<ChainTransaction, Error> {
        self.transactions
            .get(&(chain, normalize_tx_hash(tx_hash)))
            .cloned()
            .ok_or_else(|| {
                Error::chain_fetch(format!("no recorded transaction {tx_hash} on {chain}"))
            })
    }

    fn get_transaction_receipt(&self, chain: Chain, tx_hash: &str) -> Result<ChainReceipt, Error> {
        self.receipts
            .get(&(chain, normalize_tx_hash(tx_hash)))
            .cloned()
            .ok_or_else(|| Error::chain_fetch(format!("no recorded receipt {tx_hash} on {chain}")))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use alloy_primitives::Bytes;

    use super::*;

    fn recorded_tx() -> (ChainTransaction, ChainReceipt) {
        (
            ChainTransaction {
                input: Bytes::from(vec![0xef, 0x43, 0x14, 0x37]),
            },
            ChainReceipt { logs: Vec::new() },
        )
    }

    #[test]
    fn lookup_is_scoped_to_the_recorded_chain() {
        let (tx, receipt) = recorded_tx();
        let rpc = FixtureChainRpc::new().with_transaction(Chain::Optimism, "0xABC", tx, receipt);

        assert!(rpc.get_transaction(Chain::Optimism, "0xabc").is_ok());
        let receipt = rpc.get_transaction_receipt(Chain::Optimism, "0xabc");
        assert!(receipt.is_ok());

        let err = rpc.get_transaction(Chain::Arbitrum, "0xabc").unwrap_err();
        assert!(matches!(err, Error::ChainFetch { .. }));
        let receipt = rpc.get_transaction_receipt(Chain::Arbitrum, "0xabc");
        assert!(receipt.is_err());
    }

    #[test]
    fn recorded_json_is_grouped_by_chain() {
        let json = r#"{
            "arbitrum": {
                "transactions": {"0xAA": {"hash": "0xaa", "input": "0xef431437"}},
                "receipts": {"0xAA": {"status": "0x1", "logs": []}}
            },
            "optimism": {
                "transactions": {"0xbb": {"hash": "0xbb", "input": "0x"}}
            }
        }"#;
        let recorded: RecordedChainData = serde_json::from_str(json).unwrap();
        let rpc = FixtureChainRpc::from_recorded(recorded).unwrap();

        assert_eq!(rpc.len(), 2);
        let tx = rpc.get_transaction(Chain::Arbitrum, "0xaa").unwrap();
        assert_eq!(tx.input.as_ref(), &[0xef, 0x43, 0x14, 0x37]);
        assert!(rpc.get_transaction(Chain::Optimism, "0xaa").is_err());
        assert!(rpc.get_transaction(Chain::Optimism, "0xbb").is_ok());
        let receipt = rpc.get_transaction_receipt(Chain::Optimism, "0xbb");
        assert!(receipt.is_err());
    }

    #[test]
    fn unknown_chain_name_is_rejected() {
        let recorded: RecordedChainData = serde_json::from_str(r#"{"polygon": {}}"#).unwrap();
        let err = FixtureChainRpc::from_recorded(recorded).unwrap_err();
        assert!(matches!(err, Error::UnknownChain { name } if name == "polygon"));
    }
}
