//! Joins the cross-chain and same-chain donation paths into one ledger.

pub mod cross_chain;
pub mod same_chain;

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::bridge::{BridgeApi, BridgeResolver, CorrectionTable};
use crate::eligibility::RoundEligibilityTable;
use crate::rpc::ChainRpc;
use crate::sources::{AllocationRecord, AttestationRecord, NormalizedInputs, WrapperRecord};
use crate::types::DonationRecord;

pub use cross_chain::{
    AttestationBatch, DecodeFailure, DecodedAttestation, DuplicateFill, MatchOutcome,
    ResolvedDeposit, apply_corrections, decode_attestations, match_deposits, resolve_deposits,
};
pub use same_chain::{
    AllocationExtraction, ExtractionStatus, extract_allocation, extract_allocations,
};

/// An allocation whose transaction or event could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub tx_hash: String,
    pub chain_id: u64,
    pub reason: String,
}

/// Per-run counts of what was loaded, dropped and reconciled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub attestation_rows_loaded: usize,
    pub wrapper_rows_loaded: usize,
    pub wrapper_rows_dropped: usize,
    pub allocation_rows_loaded: usize,
    pub allocation_rows_dropped: usize,
    pub rows_malformed: usize,
    pub decode_failures: Vec<DecodeFailure>,
    pub attestations_ineligible: usize,
    pub deposits_unresolved: usize,
    pub corrections_applied: usize,
    pub attestations_matched: usize,
    pub attestations_unmatched: usize,
    pub duplicate_fills: Vec<DuplicateFill>,
    pub allocation_fetch_failures: Vec<FetchFailure>,
    pub allocations_missing_event: usize,
    pub allocations_ineligible: usize,
    pub cross_chain_reconciled: usize,
    pub same_chain_reconciled: usize,
}

impl ReconciliationReport {
    fn record_inputs(&mut self, inputs: &NormalizedInputs) {
        self.attestation_rows_loaded = inputs.attestation_rows_loaded;
        self.wrapper_rows_loaded = inputs.wrapper_rows_loaded;
        self.wrapper_rows_dropped = inputs.wrapper_rows_dropped;
        self.allocation_rows_loaded = inputs.allocation_rows_loaded;
        self.allocation_rows_dropped = inputs.allocation_rows_dropped;
        self.rows_malformed = inputs.rows_malformed;
    }
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "attestation rows loaded:    {}",
            self.attestation_rows_loaded
        )?;
        writeln!(
            f,
            "wrapper rows loaded:        {} ({} non-deposit dropped)",
            self.wrapper_rows_loaded, self.wrapper_rows_dropped
        )?;
        writeln!(
            f,
            "allocation rows loaded:     {} ({} dropped)",
            self.allocation_rows_loaded, self.allocation_rows_dropped
        )?;
        writeln!(f, "malformed rows skipped:     {}", self.rows_malformed)?;
        writeln!(
            f,
            "attestation decode errors:  {}",
            self.decode_failures.len()
        )?;
        writeln!(
            f,
            "attestations ineligible:    {}",
            self.attestations_ineligible
        )?;
        writeln!(
            f,
            "deposits unresolved:        {}",
            self.deposits_unresolved
        )?;
        writeln!(
            f,
            "corrections applied:        {}",
            self.corrections_applied
        )?;
        writeln!(
            f,
            "attestations matched:       {} ({} unmatched)",
            self.attestations_matched, self.attestations_unmatched
        )?;
        writeln!(
            f,
            "duplicate fill ids:         {}",
            self.duplicate_fills.len()
        )?;
        writeln!(
            f,
            "allocation fetch failures:  {}",
            self.allocation_fetch_failures.len()
        )?;
        writeln!(
            f,
            "allocations without event:  {}",
            self.allocations_missing_event
        )?;
        writeln!(
            f,
            "allocations ineligible:     {}",
            self.allocations_ineligible
        )?;
        writeln!(
            f,
            "cross-chain reconciled:     {}",
            self.cross_chain_reconciled
        )?;
        write!(
            f,
            "same-chain reconciled:      {}",
            self.same_chain_reconciled
        )
    }
}

/// Output of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub same_chain: Vec<DonationRecord>,
    pub cross_chain: Vec<DonationRecord>,
    pub report: ReconciliationReport,
}

impl Reconciliation {
    /// Same-chain records first, then cross-chain, each in input order.
    pub fn combined(&self) -> Vec<DonationRecord> {
        self.same_chain
            .iter()
            .chain(&self.cross_chain)
            .cloned()
            .collect()
    }
}

pub struct Reconciler<A, R> {
    resolver: BridgeResolver<A>,
    rpc: R,
    corrections: CorrectionTable,
    eligibility: RoundEligibilityTable,
}

impl<A: BridgeApi, R: ChainRpc> Reconciler<A, R> {
    /// A reconciler with the GG20 round and correction tables.
    pub fn new(bridge: A, rpc: R) -> Self {
        Self {
            resolver: BridgeResolver::new(bridge),
            rpc,
            corrections: CorrectionTable::gg20(),
            eligibility: RoundEligibilityTable::gg20(),
        }
    }

    #[must_use]
    pub fn with_corrections(mut self, corrections: CorrectionTable) -> Self {
        self.corrections = corrections;
        self
    }

    #[must_use]
    pub fn with_eligibility(mut self, eligibility: RoundEligibilityTable) -> Self {
        self.eligibility = eligibility;
        self
    }

    /// Resolves, corrects, decodes and joins the cross-chain path.
    pub fn reconcile_cross_chain(
        &self,
        attestations: &[AttestationRecord],
        wrappers: &[WrapperRecord],
        report: &mut ReconciliationReport,
    ) -> Vec<DonationRecord> {
        let resolved = resolve_deposits(&self.resolver, wrappers);
        let corrected = apply_corrections(&self.corrections, resolved);
        report.corrections_applied = corrected.iter().filter(|d| d.corrected).count();
        report.deposits_unresolved = corrected
            .iter()
            .filter(|d| !d.lookup.is_resolved())
            .count();

        let batch = decode_attestations(attestations, &self.eligibility);
        report.attestations_ineligible = batch.ineligible;
        report.decode_failures = batch.failures;

        let outcome = match_deposits(&batch.eligible, &corrected);
        report.attestations_matched = outcome.matched;
        report.attestations_unmatched = outcome.unmatched;
        report.duplicate_fills = outcome.duplicate_fills;
        report.cross_chain_reconciled = outcome
            .records
            .iter()
            .filter(|r| r.is_reconciled())
            .count();

        info!(
            deposits = corrected.len(),
            attestations = attestations.len(),
            records = outcome.records.len(),
            "cross-chain path reconciled"
        );
        outcome.records
    }

    /// Extracts every allocation and keeps the eligible ones.
    pub fn reconcile_same_chain(
        &self,
        allocations: &[AllocationRecord],
        report: &mut ReconciliationReport,
    ) -> Vec<DonationRecord> {
        let mut records = Vec::new();
        for (allocation, extraction) in allocations
            .iter()
            .zip(extract_allocations(&self.rpc, &self.eligibility, allocations))
        {
            match extraction.status {
                ExtractionStatus::EventDecoded => {}
                ExtractionStatus::EventMissing => report.allocations_missing_event += 1,
                ExtractionStatus::FetchFailed { reason } => {
                    report.allocation_fetch_failures.push(FetchFailure {
                        tx_hash: allocation.tx_hash.clone(),
                        chain_id: allocation.chain.id(),
                        reason,
                    });
                }
            }
            if extraction.eligible {
                records.push(extraction.record);
            } else {
                report.allocations_ineligible += 1;
            }
        }
        report.same_chain_reconciled = records.iter().filter(|r| r.is_reconciled()).count();

        info!(
            allocations = allocations.len(),
            records = records.len(),
            "same-chain path reconciled"
        );
        records
    }

    pub fn run(&self, inputs: &NormalizedInputs) -> Reconciliation {
        let mut report = ReconciliationReport::default();
        report.record_inputs(inputs);
        let cross_chain =
            self.reconcile_cross_chain(&inputs.attestations, &inputs.wrappers, &mut report);
        let same_chain = self.reconcile_same_chain(&inputs.allocations, &mut report);
        Reconciliation {
            same_chain,
            cross_chain,
            report,
        }
    }
}
