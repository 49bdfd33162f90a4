//! Transaction and receipt retrieval for the same-chain path.

pub mod fixture;
pub mod http;

use alloy_primitives::{B256, Bytes};
use serde::Deserialize;

use crate::chains::Chain;
use crate::error::Error;

pub use fixture::FixtureChainRpc;
pub use http::JsonRpcClient;

/// The subset of `eth_getTransactionByHash` the extractor reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainTransaction {
    pub input: Bytes,
}

/// The subset of `eth_getTransactionReceipt` the extractor reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainReceipt {
    #[serde(default)]
    pub logs: Vec<RpcLog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcLog {
    #[serde(default)]
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Chain access keyed by the chain the transaction lives on.
pub trait ChainRpc {
    fn get_transaction(&self, chain: Chain, tx_hash: &str) -> Result<ChainTransaction, Error>;

    fn get_transaction_receipt(&self, chain: Chain, tx_hash: &str) -> Result<ChainReceipt, Error>;
}

impl<T: ChainRpc + ?Sized> ChainRpc for Box<T> {
    fn get_transaction(&self, chain: Chain, tx_hash: &str) -> Result<ChainTransaction, Error> {
        (**self).get_transaction(chain, tx_hash)
    }

    fn get_transaction_receipt(&self, chain: Chain, tx_hash: &str) -> Result<ChainReceipt, Error> {
        (**self).get_transaction_receipt(chain, tx_hash)
    }
}
