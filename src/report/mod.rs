//! Flat export and audit summary of the reconciled ledger.

pub mod ledger;
pub mod summary;

use std::path::Path;

use crate::error::Error;
use crate::reconcile::Reconciliation;

pub use ledger::{LedgerRow, write_ledger, write_ledger_file};
pub use summary::{
    AmountStats, ChainBreakdown, DonationSummary, GroupStats, LedgerSummaries, RoundCount,
};

pub const SAME_CHAIN_FILE: &str = "same_chain.csv";
pub const CROSS_CHAIN_FILE: &str = "cross_chain.csv";
pub const COMBINED_FILE: &str = "combined.csv";
pub const REPORT_FILE: &str = "report.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Writes the three ledgers, the run report and the ledger summaries into
/// `out_dir`.
pub fn write_outputs(out_dir: &Path, reconciliation: &Reconciliation) -> Result<(), Error> {
    std::fs::create_dir_all(out_dir)?;
    write_ledger_file(&out_dir.join(SAME_CHAIN_FILE), &reconciliation.same_chain)?;
    write_ledger_file(&out_dir.join(CROSS_CHAIN_FILE), &reconciliation.cross_chain)?;
    write_ledger_file(&out_dir.join(COMBINED_FILE), &reconciliation.combined())?;
    let report = serde_json::to_string_pretty(&reconciliation.report)?;
    std::fs::write(out_dir.join(REPORT_FILE), report)?;
    let summaries = LedgerSummaries::from_reconciliation(reconciliation);
    let summaries = serde_json::to_string_pretty(&summaries)?;
    std::fs::write(out_dir.join(SUMMARY_FILE), summaries)?;
    Ok(())
}
