use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::abi::{AttestationPayload, decode_attestation_data, round_id_to_u64};
use crate::bridge::{BridgeApi, BridgeResolver, CorrectionTable};
use crate::eligibility::RoundEligibilityTable;
use crate::error::Error;
use crate::sources::{AttestationRecord, WrapperRecord};
use crate::types::{AttestationRef, BridgeLookupResult, DonationRecord, Provenance};

/// A wrapper deposit together with what the bridge says became of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDeposit {
    pub wrapper: WrapperRecord,
    pub lookup: BridgeLookupResult,
    pub corrected: bool,
}

/// Bulk resolver pass: one lookup per wrapper deposit, in row order.
pub fn resolve_deposits<A: BridgeApi>(
    resolver: &BridgeResolver<A>,
    wrappers: &[WrapperRecord],
) -> Vec<ResolvedDeposit> {
    wrappers
        .iter()
        .map(|wrapper| ResolvedDeposit {
            wrapper: wrapper.clone(),
            lookup: resolver.resolve(&wrapper.tx_hash, wrapper.origin_chain.id()),
            corrected: false,
        })
        .collect()
}

/// Runs the correction table over the resolved deposits.
pub fn apply_corrections(
    corrections: &CorrectionTable,
    deposits: Vec<ResolvedDeposit>,
) -> Vec<ResolvedDeposit> {
    deposits
        .into_iter()
        .map(|deposit| {
            let (lookup, applied) = corrections.apply(
                &deposit.wrapper.tx_hash,
                deposit.wrapper.origin_chain.id(),
                deposit.lookup,
            );
            ResolvedDeposit {
                wrapper: deposit.wrapper,
                lookup,
                corrected: deposit.corrected || applied,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAttestation {
    pub attestation: AttestationRecord,
    pub payload: AttestationPayload,
    pub round_id: u64,
}

/// An attestation excluded because its payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    pub tx_hash: String,
    pub uid: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttestationBatch {
    pub eligible: Vec<DecodedAttestation>,
    pub ineligible: usize,
    pub failures: Vec<DecodeFailure>,
}

fn decode_attestation(attestation: &AttestationRecord) -> Result<DecodedAttestation, Error> {
    let payload = decode_attestation_data(&attestation.data)?;
    let round_id = round_id_to_u64(payload.round_id)?;
    Ok(DecodedAttestation {
        attestation: attestation.clone(),
        payload,
        round_id,
    })
}

/// Decodes every attestation and keeps those in an eligible round of their
/// destination chain.
pub fn decode_attestations(
    attestations: &[AttestationRecord],
    eligibility: &RoundEligibilityTable,
) -> AttestationBatch {
    let mut batch = AttestationBatch::default();
    for attestation in attestations {
        match decode_attestation(attestation) {
            Ok(decoded) => {
                let chain_id = decoded.attestation.destination_chain.id();
                if eligibility.is_eligible(chain_id, decoded.round_id) {
                    batch.eligible.push(decoded);
                } else {
                    batch.ineligible += 1;
                }
            }
            Err(e) => {
                warn!(
                    tx_hash = %attestation.tx_hash,
                    uid = %attestation.uid,
                    error = %e,
                    "excluding undecodable attestation"
                );
                batch.failures.push(DecodeFailure {
                    tx_hash: attestation.tx_hash.clone(),
                    uid: attestation.uid.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    batch
}

/// Several deposits claiming the same fill transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateFill {
    pub fill_tx_hash: String,
    pub origin_tx_hashes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub records: Vec<DonationRecord>,
    pub matched: usize,
    pub unmatched: usize,
    pub duplicate_fills: Vec<DuplicateFill>,
}

fn cross_chain_record(
    decoded: &DecodedAttestation,
    deposit: Option<&ResolvedDeposit>,
) -> DonationRecord {
    let attestation = &decoded.attestation;
    DonationRecord {
        provenance: Provenance::CrossChain,
        donor: Some(decoded.payload.donor),
        recipient_id: Some(decoded.payload.recipient_id),
        round_id: Some(decoded.round_id),
        token: Some(decoded.payload.token_sent),
        amount: Some(decoded.payload.amount),
        origin_address: Some(decoded.payload.origin),
        origin_chain: deposit.map(|d| d.wrapper.origin_chain.id()),
        destination_chain: Some(attestation.destination_chain.id()),
        origin_tx_hash: deposit.map(|d| d.wrapper.tx_hash.clone()),
        origin_tx_from: deposit.map(|d| d.wrapper.from.clone()),
        origin_tx_to: deposit.map(|d| d.wrapper.to.clone()),
        destination_tx_hash: deposit.and_then(|d| d.lookup.fill_tx_hash.clone()),
        bridge_status: deposit.and_then(|d| d.lookup.status.clone()),
        bridge_message: deposit.and_then(|d| d.lookup.message.clone()),
        attestation: Some(AttestationRef {
            attester: attestation.attester.clone(),
            uid: attestation.uid.clone(),
            recipient: attestation.recipient.clone(),
            tx_hash: attestation.tx_hash.clone(),
        }),
    }
}

/// Left join of attestations onto deposits, `attestation.tx_hash == fill_tx_hash`.
///
/// An attestation matching several deposits yields one record per deposit.
/// Attestations without a deposit are kept with empty origin fields.
pub fn match_deposits(
    attestations: &[DecodedAttestation],
    deposits: &[ResolvedDeposit],
) -> MatchOutcome {
    let mut by_fill: HashMap<&str, Vec<&ResolvedDeposit>> = HashMap::new();
    let mut fill_order: Vec<&str> = Vec::new();
    for deposit in deposits {
        if let Some(fill) = deposit.lookup.fill_tx_hash.as_deref() {
            let entry = by_fill.entry(fill).or_default();
            if entry.is_empty() {
                fill_order.push(fill);
            }
            entry.push(deposit);
        }
    }

    let duplicate_fills: Vec<DuplicateFill> = fill_order
        .iter()
        .filter_map(|fill| {
            let matches = by_fill.get(fill)?;
            (matches.len() > 1).then(|| DuplicateFill {
                fill_tx_hash: (*fill).to_string(),
                origin_tx_hashes: matches.iter().map(|d| d.wrapper.tx_hash.clone()).collect(),
            })
        })
        .collect();
    for duplicate in &duplicate_fills {
        warn!(
            fill_tx_hash = %duplicate.fill_tx_hash,
            deposits = duplicate.origin_tx_hashes.len(),
            "multiple deposits resolve to the same fill"
        );
    }

    let mut outcome = MatchOutcome {
        duplicate_fills,
        ..MatchOutcome::default()
    };
    for decoded in attestations {
        match by_fill.get(decoded.attestation.tx_hash.as_str()) {
            Some(matches) => {
                outcome.matched += 1;
                outcome
                    .records
                    .extend(matches.iter().map(|d| cross_chain_record(decoded, Some(d))));
            }
            None => {
                outcome.unmatched += 1;
                outcome.records.push(cross_chain_record(decoded, None));
            }
        }
    }
    outcome
}
