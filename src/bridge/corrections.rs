//! Manually verified overrides for deposits the bridge API misreports.

use tracing::info;

use crate::chains::{Chain, normalize_tx_hash};
use crate::types::BridgeLookupResult;

/// Across reports the wrong fill for this Optimism deposit; the donation
/// attested in `GG20_OPTIMISM_DEPOSIT_FILL` on Arbitrum is its true fill.
pub const GG20_OPTIMISM_DEPOSIT_TX: &str =
    "0x9d83208add1a5517dd53e6ba392c66e36ec876317a1b39861c7eb9980fbf420a";
pub const GG20_OPTIMISM_DEPOSIT_FILL: &str =
    "0x7798d6ceb4f3f18f377c15980a2e19ac37f1c75d6e0f7d5f4a0ce8908337d76a";
const GG20_OPTIMISM_DEPOSIT_MESSAGE: &str = concat!(
    "0x",
    "0000000000000000000000000000000000000000000000000000000000000040",
    "0000000000000000000000000000000000000000000000000000000000000220",
    "00000000000000000000000000000000000000000000000000000000000001c0",
    "000000000000000000000000000000000000000000000000000000000000001d",
    "0000000000000000000000004a3755eb99ae8b22aafb8f16f0c51cf68eb60b85",
    "0000000000000000000000000000000000000000000000000000000000000060",
    "0000000000000000000000000000000000000000000000000000000000000140",
    "00000000000000000000000088e5e09a58292ec59ff229130c1f83b37b61e073",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000060",
    "000000000000000000000000eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
    "0000000000000000000000000000000000000000000000000001269e991cf5fc",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "00000000000000000000000000000000000000000000000000000000000000a0",
    "0000000000000000000000000000000000000000000000000000000000000020",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000041",
    "17016dcf9195e94de823a66dea9fa5db24018e2ab9325203989c3170b0c55741",
    "19b79bcdd72f220e61a9f2f21e8d40eb7933fbacaa78b563c22788c780c5ee18",
    "1b00000000000000000000000000000000000000000000000000000000000000",
);

/// Replacement lookup result for one `(origin tx, origin chain)` deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionEntry {
    pub origin_tx_hash: String,
    pub origin_chain_id: u64,
    pub result: BridgeLookupResult,
}

impl CorrectionEntry {
    fn matches(&self, origin_tx_hash: &str, origin_chain_id: u64) -> bool {
        self.origin_chain_id == origin_chain_id
            && self.origin_tx_hash == normalize_tx_hash(origin_tx_hash)
    }
}

/// Override table keyed by natural deposit identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionTable {
    entries: Vec<CorrectionEntry>,
}

impl CorrectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gg20() -> Self {
        Self::new().with_entry(
            GG20_OPTIMISM_DEPOSIT_TX,
            Chain::Optimism.id(),
            BridgeLookupResult {
                status: Some("filled".to_string()),
                message: Some(GG20_OPTIMISM_DEPOSIT_MESSAGE.to_string()),
                fill_tx_hash: Some(GG20_OPTIMISM_DEPOSIT_FILL.to_string()),
                destination_chain: Some(Chain::Arbitrum.id()),
            },
        )
    }

    /// Adds or replaces the override for a deposit.
    pub fn with_entry(
        mut self,
        origin_tx_hash: &str,
        origin_chain_id: u64,
        mut result: BridgeLookupResult,
    ) -> Self {
        let origin_tx_hash = normalize_tx_hash(origin_tx_hash);
        result.fill_tx_hash = result.fill_tx_hash.as_deref().map(normalize_tx_hash);
        self.entries.retain(|e| {
            !(e.origin_tx_hash == origin_tx_hash && e.origin_chain_id == origin_chain_id)
        });
        self.entries.push(CorrectionEntry {
            origin_tx_hash,
            origin_chain_id,
            result,
        });
        self
    }

    pub fn lookup(&self, origin_tx_hash: &str, origin_chain_id: u64) -> Option<&CorrectionEntry> {
        self.entries
            .iter()
            .find(|e| e.matches(origin_tx_hash, origin_chain_id))
    }

    /// Returns the override for the deposit if one exists, otherwise `result`
    /// unchanged. Applying twice yields the same value as applying once.
    pub fn apply(
        &self,
        origin_tx_hash: &str,
        origin_chain_id: u64,
        result: BridgeLookupResult,
    ) -> (BridgeLookupResult, bool) {
        match self.lookup(origin_tx_hash, origin_chain_id) {
            Some(entry) => {
                if entry.result != result {
                    info!(
                        tx_hash = origin_tx_hash,
                        origin_chain_id,
                        reported_fill = ?result.fill_tx_hash,
                        corrected_fill = ?entry.result.fill_tx_hash,
                        "applying bridge correction"
                    );
                }
                (entry.result.clone(), true)
            }
            None => (result, false),
        }
    }

    pub fn entries(&self) -> &[CorrectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
