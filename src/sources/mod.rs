//! Loading of the explorer/indexer CSV exports.

pub mod normalize;

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::chains::Chain;
use crate::error::Error;
use crate::types::{RawAllocationRow, RawAttestationRow, RawWrapperRow};

pub use normalize::{
    AllocationRecord, AttestationRecord, Normalized, WrapperRecord, normalize_allocations,
    normalize_attestations, normalize_wrappers,
};

/// A CSV row type with the columns it cannot do without.
pub trait SourceRow: DeserializeOwned {
    const REQUIRED_COLUMNS: &'static [&'static str];
}

impl SourceRow for RawAttestationRow {
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["attester", "data", "recipient", "txid", "id"];
}

impl SourceRow for RawWrapperRow {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["Txhash", "From", "To", "Method"];
}

impl SourceRow for RawAllocationRow {
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["Txhash", "From", "Method", "Value_IN(ETH)", "Status"];
}

/// Rows that deserialized, plus the number that did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRows<T> {
    pub rows: Vec<T>,
    pub malformed: usize,
}

/// Reads every row of a CSV export after checking its header.
///
/// A missing required column fails the whole file before any row is read.
/// A row that does not deserialize is logged, counted and skipped.
pub fn read_rows<T: SourceRow, R: Read>(reader: R, label: &str) -> Result<SourceRows<T>, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in T::REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(Error::SchemaMismatch {
                file: label.to_string(),
                column: (*column).to_string(),
            });
        }
    }

    let mut loaded = SourceRows {
        rows: Vec::new(),
        malformed: 0,
    };
    for result in csv_reader.deserialize::<T>() {
        match result {
            Ok(row) => loaded.rows.push(row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(
                    file = label,
                    line = ?e.position().map(csv::Position::line),
                    error = %e,
                    "skipping malformed row"
                );
                loaded.malformed += 1;
            }
        }
    }
    Ok(loaded)
}

pub fn load_rows<T: SourceRow>(path: &Path) -> Result<SourceRows<T>, Error> {
    let file = std::fs::File::open(path)?;
    let loaded = read_rows(file, &path.display().to_string())?;
    info!(
        path = %path.display(),
        rows = loaded.rows.len(),
        malformed = loaded.malformed,
        "loaded export"
    );
    Ok(loaded)
}

/// One export file and the chain it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub chain: Chain,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, chain: Chain) -> Self {
        Self {
            path: path.into(),
            chain,
        }
    }
}

/// Export files per kind. Attestation files are tagged with their
/// destination chain, wrapper files with their origin chain, allocation
/// files with the chain they were sent on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceSet {
    #[serde(default)]
    pub attestations: Vec<SourceFile>,
    #[serde(default)]
    pub wrappers: Vec<SourceFile>,
    #[serde(default)]
    pub allocations: Vec<SourceFile>,
}

impl Default for SourceSet {
    fn default() -> Self {
        Self::gg20()
    }
}

impl SourceSet {
    pub fn gg20() -> Self {
        Self {
            attestations: vec![
                SourceFile::new("attestations_arbitrum.csv", Chain::Arbitrum),
                SourceFile::new("attestations_optimism.csv", Chain::Optimism),
            ],
            wrappers: vec![
                SourceFile::new("arbitrum_wrapper.csv", Chain::Arbitrum),
                SourceFile::new("optimism_wrapper.csv", Chain::Optimism),
                SourceFile::new("ethereum_wrapper.csv", Chain::Ethereum),
                SourceFile::new("base_wrapper.csv", Chain::Base),
                SourceFile::new("linea_wrapper.csv", Chain::Linea),
                SourceFile::new("zksync_wrapper.csv", Chain::ZkSync),
            ],
            allocations: vec![
                SourceFile::new("arbitrum_allo.csv", Chain::Arbitrum),
                SourceFile::new("optimism_allo.csv", Chain::Optimism),
            ],
        }
    }
}

/// Everything the reconciler consumes, already normalized.
#[derive(Debug, Clone, Default)]
pub struct NormalizedInputs {
    pub attestations: Vec<AttestationRecord>,
    pub wrappers: Vec<WrapperRecord>,
    pub allocations: Vec<AllocationRecord>,
    pub attestation_rows_loaded: usize,
    pub wrapper_rows_loaded: usize,
    pub wrapper_rows_dropped: usize,
    pub allocation_rows_loaded: usize,
    pub allocation_rows_dropped: usize,
    /// Rows skipped in any export because they did not deserialize.
    pub rows_malformed: usize,
}

impl NormalizedInputs {
    pub fn add_attestations(&mut self, rows: Vec<RawAttestationRow>, destination: Chain) {
        self.attestation_rows_loaded += rows.len();
        self.attestations
            .extend(normalize_attestations(rows, destination));
    }

    pub fn add_wrappers(&mut self, rows: Vec<RawWrapperRow>, origin: Chain) {
        self.wrapper_rows_loaded += rows.len();
        let normalized = normalize_wrappers(rows, origin);
        self.wrapper_rows_dropped += normalized.dropped;
        self.wrappers.extend(normalized.records);
    }

    pub fn add_allocations(&mut self, rows: Vec<RawAllocationRow>, chain: Chain) {
        self.allocation_rows_loaded += rows.len();
        let normalized = normalize_allocations(rows, chain);
        self.allocation_rows_dropped += normalized.dropped;
        self.allocations.extend(normalized.records);
    }
}

/// Loads and normalizes every file of `sources`, resolving relative paths
/// against `data_dir`.
pub fn load_inputs(sources: &SourceSet, data_dir: &Path) -> Result<NormalizedInputs, Error> {
    let mut inputs = NormalizedInputs::default();
    for file in &sources.attestations {
        let loaded = load_rows::<RawAttestationRow>(&data_dir.join(&file.path))?;
        inputs.rows_malformed += loaded.malformed;
        inputs.add_attestations(loaded.rows, file.chain);
    }
    for file in &sources.wrappers {
        let loaded = load_rows::<RawWrapperRow>(&data_dir.join(&file.path))?;
        inputs.rows_malformed += loaded.malformed;
        inputs.add_wrappers(loaded.rows, file.chain);
    }
    for file in &sources.allocations {
        let loaded = load_rows::<RawAllocationRow>(&data_dir.join(&file.path))?;
        inputs.rows_malformed += loaded.malformed;
        inputs.add_allocations(loaded.rows, file.chain);
    }
    Ok(inputs)
}
