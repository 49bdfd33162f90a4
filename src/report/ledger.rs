use std::io::Write;
use std::path::Path;

use alloy_primitives::Address;
use serde::Serialize;
use tracing::info;

use crate::chains::Chain;
use crate::error::Error;
use crate::types::{DonationRecord, format_eth};

/// Flat export row. Addresses are EIP-55 checksummed, amounts are given both
/// raw and scaled by 10^18.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    pub provenance: String,
    pub donor: Option<String>,
    pub recipient_id: Option<String>,
    pub round_id: Option<u64>,
    pub token: Option<String>,
    pub amount: Option<String>,
    pub amount_eth: Option<String>,
    pub origin_address: Option<String>,
    pub origin_chain: Option<u64>,
    pub origin_chain_name: Option<&'static str>,
    pub origin_color: Option<&'static str>,
    pub destination_chain: Option<u64>,
    pub destination_chain_name: Option<&'static str>,
    pub destination_color: Option<&'static str>,
    pub origin_tx_hash: Option<String>,
    pub origin_tx_from: Option<String>,
    pub origin_tx_to: Option<String>,
    pub destination_tx_hash: Option<String>,
    pub bridge_status: Option<String>,
    pub bridge_message: Option<String>,
    pub attester: Option<String>,
    pub attestation_recipient: Option<String>,
    pub attestation_uid: Option<String>,
}

fn checksum(address: Option<Address>) -> Option<String> {
    address.map(|a| a.to_checksum(None))
}

fn known_chain(chain_id: Option<u64>) -> Option<Chain> {
    chain_id.and_then(Chain::from_id)
}

impl From<&DonationRecord> for LedgerRow {
    fn from(record: &DonationRecord) -> Self {
        let origin = known_chain(record.origin_chain);
        let destination = known_chain(record.destination_chain);
        let attestation = record.attestation.as_ref();
        Self {
            provenance: record.provenance.to_string(),
            donor: checksum(record.donor),
            recipient_id: checksum(record.recipient_id),
            round_id: record.round_id,
            token: checksum(record.token),
            amount: record.amount.map(|a| a.to_string()),
            amount_eth: record.amount.map(format_eth),
            origin_address: checksum(record.origin_address),
            origin_chain: record.origin_chain,
            origin_chain_name: origin.map(Chain::display_name),
            origin_color: origin.map(Chain::color),
            destination_chain: record.destination_chain,
            destination_chain_name: destination.map(Chain::display_name),
            destination_color: destination.map(Chain::color),
            origin_tx_hash: record.origin_tx_hash.clone(),
            origin_tx_from: record.origin_tx_from.clone(),
            origin_tx_to: record.origin_tx_to.clone(),
            destination_tx_hash: record.destination_tx_hash.clone(),
            bridge_status: record.bridge_status.clone(),
            bridge_message: record.bridge_message.clone(),
            attester: attestation.map(|a| a.attester.clone()),
            attestation_recipient: attestation.map(|a| a.recipient.clone()),
            attestation_uid: attestation.map(|a| a.uid.clone()),
        }
    }
}

pub fn write_ledger<W: Write>(writer: W, records: &[DonationRecord]) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(LedgerRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_ledger_file(path: &Path, records: &[DonationRecord]) -> Result<(), Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_ledger(file, records)?;
    info!(path = %path.display(), rows = records.len(), "wrote ledger");
    Ok(())
}
