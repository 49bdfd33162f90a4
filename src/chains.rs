use serde::{Deserialize, Serialize};

/// Across `deposits/details` endpoint used to resolve origin deposits to fills.
pub const ACROSS_DEPOSIT_DETAILS_URL: &str = "https://api.across.to/deposits/details";

pub const ARBITRUM_RPC_URL: &str = "https://arb1.arbitrum.io/rpc";
pub const OPTIMISM_RPC_URL: &str = "https://mainnet.optimism.io";

/// The fixed set of networks the GG20 exports cover.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Optimism,
    Arbitrum,
    Base,
    Linea,
    ZkSync,
}

impl Chain {
    pub fn from_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            1 => Some(Self::Ethereum),
            10 => Some(Self::Optimism),
            42161 => Some(Self::Arbitrum),
            8453 => Some(Self::Base),
            59144 => Some(Self::Linea),
            324 => Some(Self::ZkSync),
            _ => None,
        }
    }

    pub fn id(self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Optimism => 10,
            Self::Arbitrum => 42161,
            Self::Base => 8453,
            Self::Linea => 59144,
            Self::ZkSync => 324,
        }
    }

    /// Label used by the reporting layer.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
            Self::Base => "Base",
            Self::Linea => "Linea",
            Self::ZkSync => "zkSync Era",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Ethereum => "#627eea",
            Self::Optimism => "#ff6961",
            Self::Arbitrum => "#0033ad",
            Self::Base => "#4d88ff",
            Self::Linea => "#505050",
            Self::ZkSync => "#76e0f7",
        }
    }
}

/// Lowercases and trims a transaction hash so explorer exports, API
/// responses and RPC results compare equal.
pub fn normalize_tx_hash(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
