#![expect(
    clippy::unwrap_used,
    clippy::panic,
    reason = "test code uses unwrap/panic for concise assertions"
)]

use std::path::{Path, PathBuf};

use gg20_reconcile::reconcile::{ExtractionStatus, extract_allocation};
use gg20_reconcile::report::{COMBINED_FILE, REPORT_FILE, SUMMARY_FILE, write_outputs};
use gg20_reconcile::sources::{AllocationRecord, SourceFile};
use gg20_reconcile::{
    Chain, DonationRecord, DonationSummary, Error, FixtureBridgeApi, FixtureChainRpc,
    LedgerSummaries, NormalizedInputs, Provenance, Reconciler, Reconciliation,
    RoundEligibilityTable, SourceSet, load_inputs,
};

const CORRECTED_DEPOSIT: &str =
    "0x9d83208add1a5517dd53e6ba392c66e36ec876317a1b39861c7eb9980fbf420a";
const CORRECTED_FILL: &str = "0x7798d6ceb4f3f18f377c15980a2e19ac37f1c75d6e0f7d5f4a0ce8908337d76a";

const BASE_DEPOSIT: &str = "0xe0ab33f6e7b8fcbcad37e422ce7d472beeb2abe93868d9c7484a08e18001fa08";
const BASE_FILL: &str = "0xdb3189b8554b127af4eda004e1913720b91d0ed8025c52549100b2fd8eb51299";
const ETHEREUM_FILL: &str = "0x1569e5d966edb1096155b40c91cd4558d00fb59a55d2f580dd576cb7212f4ed7";
const LINEA_DEPOSIT: &str = "0x885fd3be915cd34747a6ac3813dab8395304e61cef729516a0e3c31b69d2497b";
const ZKSYNC_DEPOSIT: &str = "0x8adca0294d19d73ba0b6ed030683d4cb08a56cb8343f4ad52cd037048f2572ca";
const DUPLICATE_FILL: &str = "0x6047a1a2d1f8c670d358eac4db3a43fe4b60463ef4ba9b7c0dd62d9d35b6263a";
const UNMATCHED_ATTESTATION: &str =
    "0x4033dd686e9c7470c8eedc40bd0ef0100bb65377ccc2f9c1a5f8562662105768";
const BROKEN_ATTESTATION: &str =
    "0x49e507cc589d891cbf262b1fbc27dddf8b32b2a241e0f44d20444a49312a2789";
const ALLOCATION_WITHOUT_EVENT: &str =
    "0x319e5aaadd68e3c02e86a52bbc4b5f5d8030de57ab6773e65d9422c675c06fdd";
const ALLOCATION_NOT_RECORDED: &str =
    "0x2a3040cedd15b5395044c8903b73062befa696fba1d703a16641bf811b1bfd71";

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/gg20")
}

fn load_fixture_inputs() -> NormalizedInputs {
    let dir = fixture_dir();
    load_inputs(&SourceSet::gg20(), &dir)
        .unwrap_or_else(|e| panic!("failed to load exports from {}: {e}", dir.display()))
}

fn bridge() -> FixtureBridgeApi {
    FixtureBridgeApi::from_path(&fixture_dir().join("bridge.json")).unwrap()
}

fn rpc() -> FixtureChainRpc {
    FixtureChainRpc::from_path(&fixture_dir().join("rpc.json")).unwrap()
}

fn run() -> Reconciliation {
    Reconciler::new(bridge(), rpc()).run(&load_fixture_inputs())
}

fn cross_chain_by_fill<'a>(
    reconciliation: &'a Reconciliation,
    tx_hash: &str,
) -> Vec<&'a DonationRecord> {
    reconciliation
        .cross_chain
        .iter()
        .filter(|r| r.attestation.as_ref().is_some_and(|a| a.tx_hash == tx_hash))
        .collect()
}

#[test]
fn loads_and_filters_every_export() {
    let inputs = load_fixture_inputs();
    assert_eq!(inputs.attestation_rows_loaded, 8);
    assert_eq!(inputs.wrapper_rows_loaded, 8);
    assert_eq!(inputs.wrapper_rows_dropped, 2);
    assert_eq!(inputs.wrappers.len(), 6);
    assert_eq!(inputs.allocation_rows_loaded, 7);
    assert_eq!(inputs.allocation_rows_dropped, 2);
    assert_eq!(inputs.allocations.len(), 5);
}

#[test]
fn report_counts_every_stage() {
    let report = run().report;
    assert_eq!(report.decode_failures.len(), 1);
    assert_eq!(report.decode_failures[0].tx_hash, BROKEN_ATTESTATION);
    assert_eq!(report.attestations_ineligible, 2);
    assert_eq!(report.deposits_unresolved, 1);
    assert_eq!(report.corrections_applied, 1);
    assert_eq!(report.rows_malformed, 0);
    assert_eq!(report.attestations_matched, 4);
    assert_eq!(report.attestations_unmatched, 1);
    assert_eq!(report.duplicate_fills.len(), 1);
    assert_eq!(report.cross_chain_reconciled, 5);

    assert_eq!(report.allocation_fetch_failures.len(), 1);
    assert_eq!(
        report.allocation_fetch_failures[0].tx_hash,
        ALLOCATION_NOT_RECORDED
    );
    assert_eq!(report.allocations_missing_event, 1);
    assert_eq!(report.allocations_ineligible, 3);
    assert_eq!(report.same_chain_reconciled, 2);
}

#[test]
fn live_shaped_lookup_joins_origin_and_destination() {
    let reconciliation = run();
    let records = cross_chain_by_fill(&reconciliation, BASE_FILL);
    assert_eq!(records.len(), 1);
    let record = records[0];
    assert_eq!(record.origin_tx_hash.as_deref(), Some(BASE_DEPOSIT));
    assert_eq!(record.origin_chain, Some(Chain::Base.id()));
    assert_eq!(record.destination_chain, Some(Chain::Arbitrum.id()));
    assert_eq!(record.destination_tx_hash.as_deref(), Some(BASE_FILL));
    assert_eq!(record.bridge_status.as_deref(), Some("filled"));
    assert_eq!(record.bridge_message.as_deref(), Some("0x"));
    assert_eq!(
        record.origin_tx_from.as_deref(),
        Some("0x1111111111111111111111111111111111111111")
    );
    assert_eq!(
        record.origin_tx_to.as_deref(),
        Some("0x7777777777777777777777777777777777777777")
    );
    assert_eq!(record.round_id, Some(23));
    assert_eq!(
        record.amount_eth().map(|eth| (eth * 1000.0).round()),
        Some(10.0)
    );
}

#[test]
fn mixed_case_fill_hashes_still_match() {
    let reconciliation = run();
    let records = cross_chain_by_fill(&reconciliation, ETHEREUM_FILL);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].origin_chain, Some(Chain::Ethereum.id()));
    assert_eq!(records[0].destination_chain, Some(Chain::Optimism.id()));
    assert_eq!(records[0].round_id, Some(9));
}

#[test]
fn correction_overrides_the_pending_lookup() {
    let reconciliation = run();
    let records = cross_chain_by_fill(&reconciliation, CORRECTED_FILL);
    assert_eq!(records.len(), 1);
    let record = records[0];
    assert_eq!(record.origin_tx_hash.as_deref(), Some(CORRECTED_DEPOSIT));
    assert_eq!(record.origin_chain, Some(Chain::Optimism.id()));
    assert_eq!(record.destination_tx_hash.as_deref(), Some(CORRECTED_FILL));
    assert_eq!(record.bridge_status.as_deref(), Some("filled"));
}

#[test]
fn without_corrections_the_deposit_stays_unmatched() {
    let reconciliation = Reconciler::new(bridge(), rpc())
        .with_corrections(gg20_reconcile::CorrectionTable::new())
        .run(&load_fixture_inputs());
    let records = cross_chain_by_fill(&reconciliation, CORRECTED_FILL);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].origin_tx_hash, None);
    assert_eq!(reconciliation.report.corrections_applied, 0);
    assert_eq!(reconciliation.report.deposits_unresolved, 2);
    assert_eq!(reconciliation.report.attestations_unmatched, 2);
}

#[test]
fn duplicate_fill_yields_one_record_per_deposit() {
    let reconciliation = run();
    let origins: Vec<Option<&str>> = cross_chain_by_fill(&reconciliation, DUPLICATE_FILL)
        .iter()
        .map(|r| r.origin_tx_hash.as_deref())
        .collect();
    assert_eq!(origins, vec![Some(LINEA_DEPOSIT), Some(ZKSYNC_DEPOSIT)]);

    let duplicate = &reconciliation.report.duplicate_fills[0];
    assert_eq!(duplicate.fill_tx_hash, DUPLICATE_FILL);
    assert_eq!(duplicate.origin_tx_hashes.len(), 2);
}

#[test]
fn unmatched_attestation_is_kept_without_origin() {
    let reconciliation = run();
    let records = cross_chain_by_fill(&reconciliation, UNMATCHED_ATTESTATION);
    assert_eq!(records.len(), 1);
    let record = records[0];
    assert_eq!(record.origin_chain, None);
    assert_eq!(record.origin_tx_hash, None);
    assert_eq!(record.destination_tx_hash, None);
    assert!(record.donor.is_some());
    assert!(!record.is_reconciled());
}

#[test]
fn only_eligible_rounds_survive() {
    let reconciliation = run();
    let eligibility = RoundEligibilityTable::gg20();
    for record in reconciliation.combined() {
        let chain = record.destination_chain.unwrap();
        let round = record.round_id.unwrap();
        assert!(
            eligibility.is_eligible(chain, round),
            "round {round} on chain {chain} leaked into the ledger"
        );
    }
}

#[test]
fn matcher_only_emits_fills_the_bridge_reported() {
    let reconciliation = run();
    let known = [BASE_FILL, ETHEREUM_FILL, DUPLICATE_FILL, CORRECTED_FILL];
    for record in &reconciliation.cross_chain {
        if let Some(fill) = record.destination_tx_hash.as_deref() {
            assert!(known.contains(&fill), "fabricated fill {fill}");
        }
    }
}

#[test]
fn allocation_without_event_has_no_event_fields() {
    let allocation = AllocationRecord {
        tx_hash: ALLOCATION_WITHOUT_EVENT.to_string(),
        from: "0x2323232323232323232323232323232323232323".to_string(),
        value_in_eth: "0.01".to_string(),
        chain: Chain::Arbitrum,
    };
    let extraction = extract_allocation(&rpc(), &RoundEligibilityTable::gg20(), &allocation);
    assert_eq!(extraction.status, ExtractionStatus::EventMissing);
    assert!(!extraction.eligible);
    let record = extraction.record;
    assert_eq!(record.round_id, Some(24));
    assert_eq!(record.donor, None);
    assert_eq!(record.recipient_id, None);
    assert_eq!(record.token, None);
    assert_eq!(record.amount, None);
    assert_eq!(record.origin_address, None);
}

#[test]
fn same_chain_records_come_from_decoded_events() {
    let reconciliation = run();
    assert_eq!(reconciliation.same_chain.len(), 2);
    for record in &reconciliation.same_chain {
        assert_eq!(record.provenance, Provenance::SameChain);
        assert_eq!(record.origin_chain, record.destination_chain);
        assert!(record.is_reconciled());
    }
    let rounds: Vec<Option<u64>> = reconciliation
        .same_chain
        .iter()
        .map(|r| r.round_id)
        .collect();
    assert_eq!(rounds, vec![Some(23), Some(9)]);
}

#[test]
fn missing_column_aborts_loading() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("base_wrapper.csv"),
        "Txhash,From,Method\n0xabc,0x1,0x6fde4731\n",
    )
    .unwrap();
    let sources = SourceSet {
        attestations: Vec::new(),
        wrappers: vec![SourceFile::new("base_wrapper.csv", Chain::Base)],
        allocations: Vec::new(),
    };
    match load_inputs(&sources, dir.path()) {
        Err(Error::SchemaMismatch { column, .. }) => assert_eq!(column, "To"),
        other => panic!("expected schema mismatch, got {other:?}"),
    }
}

#[test]
fn truncated_wrapper_row_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    for entry in std::fs::read_dir(fixture_dir()).unwrap() {
        let path = entry.unwrap().path();
        std::fs::copy(&path, dir.path().join(path.file_name().unwrap())).unwrap();
    }
    let base = dir.path().join("base_wrapper.csv");
    let original = std::fs::read_to_string(&base).unwrap();
    let (header, rows) = original.split_once('\n').unwrap();
    std::fs::write(&base, format!("{header}\n0xdead,0x1\n{rows}")).unwrap();

    let inputs = load_inputs(&SourceSet::gg20(), dir.path()).unwrap();
    assert_eq!(inputs.rows_malformed, 1);
    assert_eq!(inputs.wrapper_rows_loaded, 8);
    assert_eq!(inputs.wrappers.len(), 6);

    let reconciliation = Reconciler::new(bridge(), rpc()).run(&inputs);
    assert_eq!(reconciliation.report.rows_malformed, 1);
    assert_eq!(cross_chain_by_fill(&reconciliation, BASE_FILL).len(), 1);
}

#[test]
fn outputs_are_written_same_chain_first() {
    let reconciliation = run();
    let dir = tempfile::tempdir().unwrap();
    write_outputs(dir.path(), &reconciliation).unwrap();

    for file in [
        "same_chain.csv",
        "cross_chain.csv",
        COMBINED_FILE,
        REPORT_FILE,
        SUMMARY_FILE,
    ] {
        assert!(dir.path().join(file).exists(), "{file} missing");
    }

    let mut reader = csv::Reader::from_path(dir.path().join(COMBINED_FILE)).unwrap();
    let headers = reader.headers().unwrap().clone();
    let provenance = headers.iter().position(|h| h == "provenance").unwrap();
    let origin_name = headers
        .iter()
        .position(|h| h == "origin_chain_name")
        .unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 8);
    assert_eq!(&rows[0][provenance], "same_chain");
    assert_eq!(&rows[1][provenance], "same_chain");
    assert!(rows[2..].iter().all(|r| &r[provenance] == "cross_chain"));
    assert_eq!(&rows[0][origin_name], "Arbitrum");

    let text = std::fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap();
    let report: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(report["corrections_applied"], 1);
    assert_eq!(report["attestations_matched"], 4);

    let text = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
    let summaries: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(summaries["cross_chain"]["donations"], 6);
    assert_eq!(summaries["same_chain"]["donations"], 2);
    assert_eq!(summaries["combined"]["donations"], 8);
}

#[test]
fn summary_over_combined_ledger() {
    let reconciliation = run();
    let summary = DonationSummary::from_records(&reconciliation.combined());
    assert_eq!(summary.donations, 8);
    assert_eq!(summary.donors.unique, 7);
    assert_eq!(summary.donors.top_count, 2);
    assert_eq!(
        summary.donors.top.as_deref(),
        Some("0x1313131313131313131313131313131313131313")
    );
    let round_23 = summary.by_round.iter().find(|r| r.round_id == 23).unwrap();
    assert_eq!(round_23.donations, 3);
}

#[test]
fn summaries_split_cross_and_same_chain() {
    let reconciliation = run();
    let summaries = LedgerSummaries::from_reconciliation(&reconciliation);
    assert_eq!(summaries.cross_chain.donations, 6);
    assert_eq!(summaries.same_chain.donations, 2);
    assert_eq!(
        summaries.combined,
        DonationSummary::from_records(&reconciliation.combined())
    );
    let rounds = &summaries.same_chain.by_round;
    assert!(rounds.iter().all(|r| r.round_id != 99));
}
