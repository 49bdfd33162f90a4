use alloy_primitives::{Address, U256};

/// One row of an EAS attestation export.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawAttestationRow {
    /// Address that issued the attestation.
    pub attester: String,
    /// ABI-encoded donation payload, `0x`-prefixed.
    pub data: String,
    /// Attestation recipient as recorded by EAS.
    pub recipient: String,
    /// Destination-chain transaction that emitted the attestation.
    pub txid: String,
    /// Attestation uid.
    pub id: String,
}

/// One row of a block-explorer export of the wrapper contract.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawWrapperRow {
    #[serde(rename = "Txhash")]
    pub tx_hash: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    /// Either the raw 4-byte selector or the explorer's decoded label.
    #[serde(rename = "Method")]
    pub method: String,
}

/// One row of a block-explorer export of direct `allocate()` calls.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawAllocationRow {
    #[serde(rename = "Txhash")]
    pub tx_hash: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Value_IN(ETH)")]
    pub value_in_eth: String,
    #[serde(rename = "Status")]
    pub status: String,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    CrossChain,
    SameChain,
}

/// Normalized answer of the bridge status lookup for one origin deposit.
///
/// Every field is `None` when the deposit could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeLookupResult {
    pub status: Option<String>,
    pub message: Option<String>,
    pub fill_tx_hash: Option<String>,
    pub destination_chain: Option<u64>,
}

impl BridgeLookupResult {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.fill_tx_hash.is_some()
    }
}

/// Attestation-side provenance of a cross-chain donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationRef {
    pub attester: String,
    pub uid: String,
    pub recipient: String,
    pub tx_hash: String,
}

/// Canonical donation record shared by the cross-chain and same-chain paths.
///
/// Fields that could not be established are `None`; nothing is defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationRecord {
    pub provenance: Provenance,
    pub donor: Option<Address>,
    pub recipient_id: Option<Address>,
    pub round_id: Option<u64>,
    pub token: Option<Address>,
    /// Smallest token unit.
    pub amount: Option<U256>,
    /// The `origin` address carried by the payload or event.
    pub origin_address: Option<Address>,
    pub origin_chain: Option<u64>,
    pub destination_chain: Option<u64>,
    pub origin_tx_hash: Option<String>,
    /// `From` / `To` of the origin transaction as exported by the explorer.
    pub origin_tx_from: Option<String>,
    pub origin_tx_to: Option<String>,
    /// Fill transaction for cross-chain donations, the allocation itself for same-chain.
    pub destination_tx_hash: Option<String>,
    pub bridge_status: Option<String>,
    pub bridge_message: Option<String>,
    pub attestation: Option<AttestationRef>,
}

impl DonationRecord {
    /// Cross-chain records are reconciled once a deposit was matched with a
    /// status; same-chain records once the allocation event was decoded.
    pub fn is_reconciled(&self) -> bool {
        match self.provenance {
            Provenance::CrossChain => {
                self.destination_tx_hash.is_some() && self.bridge_status.is_some()
            }
            Provenance::SameChain => self.amount.is_some() && self.recipient_id.is_some(),
        }
    }

    pub fn amount_eth(&self) -> Option<f64> {
        self.amount.map(to_eth)
    }
}

/// 10^18. Applied to every token regardless of its real decimals.
pub const TOKEN_SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Exact decimal rendering of `amount / 10^18`, trailing zeros trimmed.
pub fn format_eth(amount: U256) -> String {
    let whole = amount / TOKEN_SCALE;
    let frac = (amount % TOKEN_SCALE).to_string();
    let frac = format!("{frac:0>18}");
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

pub fn to_eth(amount: U256) -> f64 {
    format_eth(amount).parse().unwrap_or(f64::INFINITY)
}
