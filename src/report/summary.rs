use std::collections::BTreeMap;
use std::fmt;

use alloy_primitives::Address;
use serde::Serialize;

use crate::chains::Chain;
use crate::reconcile::Reconciliation;
use crate::types::DonationRecord;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Amount statistics in token units (amount / 10^18).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AmountStats {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
}

impl AmountStats {
    fn from_values(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            total: values.iter().sum(),
            mean: mean(values),
            median: median(values),
        }
    }
}

/// Donation counts and amounts grouped by one address.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub unique: usize,
    pub top: Option<String>,
    pub top_count: usize,
    /// Mean over groups of each group's mean donation.
    pub mean_of_means: f64,
    /// Median over groups of each group's median donation.
    pub median_of_medians: f64,
}

impl GroupStats {
    fn from_groups(groups: &BTreeMap<Address, Vec<f64>>) -> Self {
        let mut top: Option<(&Address, usize)> = None;
        for (address, amounts) in groups {
            if top.is_none_or(|(_, count)| amounts.len() > count) {
                top = Some((address, amounts.len()));
            }
        }
        let means: Vec<f64> = groups.values().map(|v| mean(v)).collect();
        let medians: Vec<f64> = groups.values().map(|v| median(v)).collect();
        Self {
            unique: groups.len(),
            top: top.map(|(address, _)| address.to_checksum(None)),
            top_count: top.map_or(0, |(_, count)| count),
            mean_of_means: mean(&means),
            median_of_medians: median(&medians),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainBreakdown {
    pub chain_id: u64,
    pub chain_name: Option<&'static str>,
    pub donations: usize,
    pub amounts: AmountStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundCount {
    pub round_id: u64,
    pub donations: usize,
    pub share_pct: f64,
}

/// Audit summary of a reconciled ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DonationSummary {
    pub donations: usize,
    pub amounts: AmountStats,
    pub donors: GroupStats,
    pub recipients: GroupStats,
    pub by_origin_chain: Vec<ChainBreakdown>,
    pub by_round: Vec<RoundCount>,
}

impl DonationSummary {
    /// Records without an amount count as donations but are left out of
    /// every amount statistic.
    pub fn from_records(records: &[DonationRecord]) -> Self {
        let amounts: Vec<f64> = records
            .iter()
            .filter_map(DonationRecord::amount_eth)
            .collect();

        let mut donors: BTreeMap<Address, Vec<f64>> = BTreeMap::new();
        let mut recipients: BTreeMap<Address, Vec<f64>> = BTreeMap::new();
        let mut chains: BTreeMap<u64, (usize, Vec<f64>)> = BTreeMap::new();
        let mut rounds: BTreeMap<u64, usize> = BTreeMap::new();

        for record in records {
            let amount = record.amount_eth();
            if let Some(donor) = record.donor {
                donors.entry(donor).or_default().extend(amount);
            }
            if let Some(recipient) = record.recipient_id {
                recipients.entry(recipient).or_default().extend(amount);
            }
            if let Some(chain_id) = record.origin_chain {
                let entry = chains.entry(chain_id).or_default();
                entry.0 += 1;
                entry.1.extend(amount);
            }
            if let Some(round_id) = record.round_id {
                *rounds.entry(round_id).or_default() += 1;
            }
        }

        let total = records.len();
        let by_round = rounds
            .into_iter()
            .map(|(round_id, donations)| RoundCount {
                round_id,
                donations,
                share_pct: if total == 0 {
                    0.0
                } else {
                    donations as f64 * 100.0 / total as f64
                },
            })
            .collect();

        let by_origin_chain = chains
            .into_iter()
            .map(|(chain_id, (donations, values))| ChainBreakdown {
                chain_id,
                chain_name: Chain::from_id(chain_id).map(Chain::display_name),
                donations,
                amounts: AmountStats::from_values(&values),
            })
            .collect();

        Self {
            donations: total,
            amounts: AmountStats::from_values(&amounts),
            donors: GroupStats::from_groups(&donors),
            recipients: GroupStats::from_groups(&recipients),
            by_origin_chain,
            by_round,
        }
    }
}

impl fmt::Display for DonationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "donations:          {}", self.donations)?;
        writeln!(f, "unique donors:      {}", self.donors.unique)?;
        writeln!(f, "unique recipients:  {}", self.recipients.unique)?;
        writeln!(
            f,
            "amount (ETH):       total {:.6}, mean {:.6}, median {:.6}",
            self.amounts.total, self.amounts.mean, self.amounts.median
        )?;
        if let Some(top) = &self.donors.top {
            writeln!(
                f,
                "top donor:          {top} ({} donations)",
                self.donors.top_count
            )?;
        }
        if let Some(top) = &self.recipients.top {
            writeln!(
                f,
                "top recipient:      {top} ({} donations)",
                self.recipients.top_count
            )?;
        }
        writeln!(
            f,
            "per donor:          mean of means {:.6}, median of medians {:.6}",
            self.donors.mean_of_means, self.donors.median_of_medians
        )?;
        writeln!(
            f,
            "per recipient:      mean of means {:.6}, median of medians {:.6}",
            self.recipients.mean_of_means, self.recipients.median_of_medians
        )?;
        for chain in &self.by_origin_chain {
            let name = chain.chain_name.unwrap_or("unknown");
            writeln!(
                f,
                "origin {name} ({}): {} donations, total {:.6}, mean {:.6}, median {:.6}",
                chain.chain_id,
                chain.donations,
                chain.amounts.total,
                chain.amounts.mean,
                chain.amounts.median
            )?;
        }
        for round in &self.by_round {
            writeln!(
                f,
                "round {}: {} donations ({:.2}%)",
                round.round_id, round.donations, round.share_pct
            )?;
        }
        Ok(())
    }
}

/// Separate summaries of the cross-chain, same-chain and combined ledgers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummaries {
    pub cross_chain: DonationSummary,
    pub same_chain: DonationSummary,
    pub combined: DonationSummary,
}

impl LedgerSummaries {
    pub fn from_reconciliation(reconciliation: &Reconciliation) -> Self {
        Self {
            cross_chain: DonationSummary::from_records(&reconciliation.cross_chain),
            same_chain: DonationSummary::from_records(&reconciliation.same_chain),
            combined: DonationSummary::from_records(&reconciliation.combined()),
        }
    }
}

impl fmt::Display for LedgerSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== cross-chain ==")?;
        writeln!(f, "{}", self.cross_chain)?;
        writeln!(f, "== same-chain ==")?;
        writeln!(f, "{}", self.same_chain)?;
        writeln!(f, "== combined ==")?;
        write!(f, "{}", self.combined)
    }
}
