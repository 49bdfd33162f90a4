#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod abi;
pub mod bridge;
pub mod chains;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod http;
pub mod reconcile;
pub mod report;
pub mod rpc;
pub mod sources;
pub mod types;

pub use abi::{AllocatedEvent, AttestationPayload, decode_attestation_data};
pub use bridge::{
    BridgeApi, BridgeResolver, BridgeResponse, CorrectionTable, FixtureBridgeApi, HttpBridgeApi,
};
pub use chains::Chain;
pub use config::Config;
pub use eligibility::RoundEligibilityTable;
pub use error::Error;
pub use http::RetryPolicy;
pub use reconcile::{Reconciler, Reconciliation, ReconciliationReport};
pub use report::{DonationSummary, LedgerRow, LedgerSummaries};
pub use rpc::{ChainRpc, FixtureChainRpc, JsonRpcClient};
pub use sources::{NormalizedInputs, SourceSet, load_inputs};
pub use types::{BridgeLookupResult, DonationRecord, Provenance};
