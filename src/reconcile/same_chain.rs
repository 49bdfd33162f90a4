use serde::Serialize;
use tracing::{debug, warn};

use crate::abi::{
    ALLOCATED_EVENT_TOPIC, AllocatedEvent, decode_allocate_round, decode_allocated_event,
};
use crate::eligibility::RoundEligibilityTable;
use crate::error::Error;
use crate::rpc::{ChainReceipt, ChainRpc, ChainTransaction};
use crate::sources::AllocationRecord;
use crate::types::{DonationRecord, Provenance};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionStatus {
    EventDecoded,
    EventMissing,
    FetchFailed { reason: String },
}

/// Result of extracting one direct allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationExtraction {
    pub record: DonationRecord,
    pub eligible: bool,
    pub status: ExtractionStatus,
}

fn fetch(
    rpc: &impl ChainRpc,
    allocation: &AllocationRecord,
) -> Result<(ChainTransaction, ChainReceipt), Error> {
    let tx = rpc.get_transaction(allocation.chain, &allocation.tx_hash)?;
    let receipt = rpc.get_transaction_receipt(allocation.chain, &allocation.tx_hash)?;
    Ok((tx, receipt))
}

fn empty_record(allocation: &AllocationRecord) -> DonationRecord {
    let chain_id = allocation.chain.id();
    DonationRecord {
        provenance: Provenance::SameChain,
        donor: None,
        recipient_id: None,
        round_id: None,
        token: None,
        amount: None,
        origin_address: None,
        origin_chain: Some(chain_id),
        destination_chain: Some(chain_id),
        origin_tx_hash: Some(allocation.tx_hash.clone()),
        origin_tx_from: Some(allocation.from.clone()),
        origin_tx_to: None,
        destination_tx_hash: Some(allocation.tx_hash.clone()),
        bridge_status: None,
        bridge_message: None,
        attestation: None,
    }
}

/// First `Allocated` log of the receipt, if any.
fn find_allocated_event(receipt: &ChainReceipt) -> Option<Result<AllocatedEvent, Error>> {
    receipt
        .logs
        .iter()
        .find(|log| log.topics.first() == Some(&ALLOCATED_EVENT_TOPIC))
        .map(|log| decode_allocated_event(&log.topics, &log.data))
}

/// Fetches the allocation's transaction and receipt and builds its record.
///
/// Never fails: fetch and decode problems yield a record with every
/// event-derived field empty and `eligible == false`.
pub fn extract_allocation(
    rpc: &impl ChainRpc,
    eligibility: &RoundEligibilityTable,
    allocation: &AllocationRecord,
) -> AllocationExtraction {
    let mut record = empty_record(allocation);

    let (tx, receipt) = match fetch(rpc, allocation) {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!(
                tx_hash = %allocation.tx_hash,
                chain = %allocation.chain,
                error = %e,
                "allocation fetch failed"
            );
            return AllocationExtraction {
                record,
                eligible: false,
                status: ExtractionStatus::FetchFailed {
                    reason: e.to_string(),
                },
            };
        }
    };

    record.round_id = match decode_allocate_round(&tx.input) {
        Ok(round_id) => Some(round_id),
        Err(e) => {
            debug!(
                tx_hash = %allocation.tx_hash,
                error = %e,
                "round id not decodable from input"
            );
            None
        }
    };

    let event = match find_allocated_event(&receipt) {
        Some(Ok(event)) => event,
        Some(Err(e)) => {
            warn!(tx_hash = %allocation.tx_hash, error = %e, "Allocated event undecodable");
            return AllocationExtraction {
                record,
                eligible: false,
                status: ExtractionStatus::FetchFailed {
                    reason: e.to_string(),
                },
            };
        }
        None => {
            warn!(
                tx_hash = %allocation.tx_hash,
                chain = %allocation.chain,
                "no Allocated event in receipt"
            );
            return AllocationExtraction {
                record,
                eligible: false,
                status: ExtractionStatus::EventMissing,
            };
        }
    };

    record.donor = Some(event.sender);
    record.recipient_id = Some(event.recipient_id);
    record.token = Some(event.token);
    record.amount = Some(event.amount);
    record.origin_address = Some(event.origin);

    let eligible = record
        .round_id
        .is_some_and(|round_id| eligibility.is_eligible(allocation.chain.id(), round_id));

    AllocationExtraction {
        record,
        eligible,
        status: ExtractionStatus::EventDecoded,
    }
}

/// Extracts every allocation in input order.
pub fn extract_allocations(
    rpc: &impl ChainRpc,
    eligibility: &RoundEligibilityTable,
    allocations: &[AllocationRecord],
) -> Vec<AllocationExtraction> {
    allocations
        .iter()
        .map(|allocation| extract_allocation(rpc, eligibility, allocation))
        .collect()
}
