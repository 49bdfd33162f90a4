use tracing::debug;

use crate::abi::{ALLOCATE_METHOD_NAME, DEPOSIT_V3_METHOD_NAME, DEPOSIT_V3_SELECTOR};
use crate::chains::{Chain, normalize_tx_hash};
use crate::types::{RawAllocationRow, RawAttestationRow, RawWrapperRow};

/// Explorer status of a reverted transaction.
pub const FAILED_TX_STATUS: &str = "Error(0)";

/// Attestation emitted on `destination_chain` for one donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationRecord {
    pub attester: String,
    pub data: String,
    pub recipient: String,
    pub tx_hash: String,
    pub uid: String,
    pub destination_chain: Chain,
}

/// A `callDepositV3` on the wrapper contract of `origin_chain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperRecord {
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    pub origin_chain: Chain,
}

/// A direct `allocate()` call on `chain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    pub tx_hash: String,
    pub from: String,
    pub value_in_eth: String,
    pub chain: Chain,
}

/// Records kept by a filtering normalizer plus the number of rows it dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

pub fn is_deposit_call(method: &str) -> bool {
    let method = method.trim();
    method.eq_ignore_ascii_case(DEPOSIT_V3_SELECTOR) || method == DEPOSIT_V3_METHOD_NAME
}

pub fn normalize_attestations(
    rows: Vec<RawAttestationRow>,
    destination_chain: Chain,
) -> Vec<AttestationRecord> {
    rows.into_iter()
        .map(|row| AttestationRecord {
            attester: row.attester,
            data: row.data,
            recipient: row.recipient,
            tx_hash: normalize_tx_hash(&row.txid),
            uid: row.id,
            destination_chain,
        })
        .collect()
}

/// Keeps only deposit calls; the wrapper export also contains unrelated
/// transactions to the same contract.
pub fn normalize_wrappers(
    rows: Vec<RawWrapperRow>,
    origin_chain: Chain,
) -> Normalized<WrapperRecord> {
    let total = rows.len();
    let records: Vec<WrapperRecord> = rows
        .into_iter()
        .filter(|row| is_deposit_call(&row.method))
        .map(|row| WrapperRecord {
            tx_hash: normalize_tx_hash(&row.tx_hash),
            from: row.from,
            to: row.to,
            origin_chain,
        })
        .collect();
    let dropped = total - records.len();
    if dropped > 0 {
        debug!(%origin_chain, dropped, "dropped non-deposit wrapper rows");
    }
    Normalized { records, dropped }
}

/// Keeps successful `Allocate` calls.
pub fn normalize_allocations(
    rows: Vec<RawAllocationRow>,
    chain: Chain,
) -> Normalized<AllocationRecord> {
    let total = rows.len();
    let records: Vec<AllocationRecord> = rows
        .into_iter()
        .filter(|row| row.method.trim() == ALLOCATE_METHOD_NAME)
        .filter(|row| row.status.trim() != FAILED_TX_STATUS)
        .map(|row| AllocationRecord {
            tx_hash: normalize_tx_hash(&row.tx_hash),
            from: row.from,
            value_in_eth: row.value_in_eth,
            chain,
        })
        .collect();
    let dropped = total - records.len();
    if dropped > 0 {
        debug!(%chain, dropped, "dropped non-allocate rows");
    }
    Normalized { records, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper_row(tx_hash: &str, method: &str) -> RawWrapperRow {
        RawWrapperRow {
            tx_hash: tx_hash.to_string(),
            from: "0x1111111111111111111111111111111111111111".to_string(),
            to: "0x2222222222222222222222222222222222222222".to_string(),
            method: method.to_string(),
        }
    }

    fn allocation_row(tx_hash: &str, method: &str, status: &str) -> RawAllocationRow {
        RawAllocationRow {
            tx_hash: tx_hash.to_string(),
            from: "0x1111111111111111111111111111111111111111".to_string(),
            method: method.to_string(),
            value_in_eth: "0".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn wrapper_rows_filtered_by_deposit_selector() {
        let rows = vec![
            wrapper_row("0xAAA", "0x6fde4731"),
            wrapper_row("0xbbb", "Call Deposit V3"),
            wrapper_row("0xccc", "Transfer"),
            wrapper_row("0xddd", "0x095ea7b3"),
        ];
        let normalized = normalize_wrappers(rows, Chain::Base);
        assert_eq!(normalized.dropped, 2);
        assert_eq!(normalized.records.len(), 2);
        assert_eq!(normalized.records[0].tx_hash, "0xaaa");
        assert!(
            normalized
                .records
                .iter()
                .all(|r| r.origin_chain == Chain::Base)
        );
    }

    #[test]
    fn selector_match_ignores_hex_case() {
        assert!(is_deposit_call("0x6FDE4731"));
        assert!(is_deposit_call(" Call Deposit V3 "));
        assert!(!is_deposit_call("call deposit v3"));
    }

    #[test]
    fn allocation_rows_drop_failed_and_foreign_calls() {
        let rows = vec![
            allocation_row("0x1", "Allocate", ""),
            allocation_row("0x2", "Allocate", "Error(0)"),
            allocation_row("0x3", "Multicall", ""),
        ];
        let normalized = normalize_allocations(rows, Chain::Optimism);
        assert_eq!(normalized.dropped, 2);
        assert_eq!(normalized.records.len(), 1);
        assert_eq!(normalized.records[0].tx_hash, "0x1");
        assert_eq!(normalized.records[0].chain, Chain::Optimism);
    }

    #[test]
    fn attestations_tagged_with_destination() {
        let rows = vec![RawAttestationRow {
            attester: "0x1".to_string(),
            data: "0x".to_string(),
            recipient: "0x2".to_string(),
            txid: "0xABC".to_string(),
            id: "0xuid".to_string(),
        }];
        let records = normalize_attestations(rows, Chain::Arbitrum);
        assert_eq!(records[0].destination_chain, Chain::Arbitrum);
        assert_eq!(records[0].tx_hash, "0xabc");
        assert_eq!(records[0].uid, "0xuid");
    }
}
