//! Trade Aggregator
//!
//! Pure transformations over a market's trade records: a chronological
//! implied-probability series for charting, a newest-first recent-trades
//! view, and per-wallet holder summaries split by side.
//!
//! Pricing is proportional stake (YES price = YES stake / total stake),
//! not an AMM curve. Every operation recomputes from the full record set it
//! is given; nothing here caches, performs I/O, or holds state, so the
//! functions are safe to call concurrently from any number of handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use plp_core::{TradeRecord, VoteType, LAMPORTS_PER_SOL};

/// Default cap on the number of chart points (most recent trades win)
pub const DEFAULT_CHART_POINTS: usize = 100;

/// One point in the implied-probability time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Trade confirmation time
    pub timestamp: DateTime<Utc>,
    /// Implied YES probability after this trade (0-100)
    pub yes_price: f64,
    /// Implied NO probability after this trade (0-100)
    pub no_price: f64,
    /// Trade size in display units (SOL)
    pub amount: f64,
    /// Side of this trade
    pub vote_type: VoteType,
}

/// A trade as presented in recent-trades listings (amounts in display units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTrade {
    pub signature: String,
    pub trader_wallet: String,
    pub vote_type: VoteType,
    /// Trade size in display units (SOL)
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl RecentTrade {
    fn from_record(record: &TradeRecord) -> Self {
        Self {
            signature: record.signature.clone(),
            trader_wallet: record.trader_wallet.clone(),
            vote_type: record.vote_type,
            amount: record.display_amount(),
            created_at: record.created_at,
        }
    }
}

/// Aggregate position of one wallet on one side of a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderPosition {
    pub wallet: String,
    /// Total staked in display units (SOL)
    pub total_amount: f64,
    /// Number of trades this wallet placed on this side
    pub trade_count: u32,
    /// Share of this side's total stake (0-100)
    pub percentage: f64,
}

/// Per-wallet holder summary for a market, split by side
///
/// `total_holders` counts entries across both lists, so a wallet staked on
/// both sides appears twice there but only once in `unique_holders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderSummary {
    /// YES holders sorted by stake descending
    pub yes_holders: Vec<HolderPosition>,
    /// NO holders sorted by stake descending
    pub no_holders: Vec<HolderPosition>,
    /// Total YES stake in display units (SOL)
    pub total_yes_stake: f64,
    /// Total NO stake in display units (SOL)
    pub total_no_stake: f64,
    pub total_holders: usize,
    pub unique_holders: usize,
}

/// Errors from aggregation over trade records
///
/// A bad record fails the whole invocation rather than being skipped:
/// silently dropping volume would corrupt the probability series and stake
/// totals without any signal to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("invalid trade record {signature}: {reason}")]
    InvalidRecord { signature: String, reason: String },
}

/// Reject the batch on the first record that fails basic validity
fn validate_records(records: &[TradeRecord]) -> Result<(), AggregatorError> {
    for record in records {
        if let Some(reason) = record.validate() {
            return Err(AggregatorError::InvalidRecord {
                signature: record.signature.clone(),
                reason,
            });
        }
    }
    Ok(())
}

/// Order records chronologically, oldest first
///
/// The running sum must always be computed oldest-to-newest, so ordering is
/// enforced here instead of trusting the caller's query sort. Ties on
/// `created_at` break on signature to keep the output deterministic.
fn sort_chronological(records: &[TradeRecord]) -> Vec<&TradeRecord> {
    let mut sorted: Vec<&TradeRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.signature.cmp(&b.signature))
    });
    sorted
}

/// Build the implied-probability chart series for a market
///
/// Keeps the `max_points` most recent records (default 100), then walks them
/// oldest-to-newest maintaining running YES/NO stake totals. Each trade
/// emits one point with the probabilities implied by the totals so far;
/// `no_price` is derived as `100 - yes_price` so the pair always sums to
/// exactly 100. With no stake yet the prior is uniform (50/50).
pub fn build_chart_series(
    records: &[TradeRecord],
    max_points: Option<usize>,
) -> Result<Vec<ChartPoint>, AggregatorError> {
    validate_records(records)?;

    let cap = max_points.unwrap_or(DEFAULT_CHART_POINTS);
    let sorted = sort_chronological(records);
    let start = sorted.len().saturating_sub(cap);
    let window = &sorted[start..];

    let mut yes_total: u128 = 0;
    let mut no_total: u128 = 0;
    let mut points = Vec::with_capacity(window.len());

    for record in window {
        match record.vote_type {
            VoteType::Yes => yes_total += record.amount as u128,
            VoteType::No => no_total += record.amount as u128,
        }

        let total = yes_total + no_total;
        let yes_price = if total > 0 {
            100.0 * yes_total as f64 / total as f64
        } else {
            50.0
        };

        points.push(ChartPoint {
            timestamp: record.created_at,
            yes_price,
            no_price: 100.0 - yes_price,
            amount: record.display_amount(),
            vote_type: record.vote_type,
        });
    }

    Ok(points)
}

/// Build the newest-first recent-trades view
///
/// Amounts are converted to display units here so raw lamport values never
/// leave the aggregation layer.
pub fn build_recent_trades(records: &[TradeRecord]) -> Result<Vec<RecentTrade>, AggregatorError> {
    validate_records(records)?;

    let mut sorted = sort_chronological(records);
    sorted.reverse();

    Ok(sorted.into_iter().map(RecentTrade::from_record).collect())
}

/// Build the per-wallet holder summary for a market
///
/// Wallets are grouped per side, each side's percentages are computed
/// against that side's own total stake, and each list is sorted by stake
/// descending with wallet address as the tie-break.
pub fn build_holder_summary(records: &[TradeRecord]) -> Result<HolderSummary, AggregatorError> {
    validate_records(records)?;

    // (total lamports, trade count) keyed by wallet, one map per side
    let mut yes_wallets: HashMap<&str, (u128, u32)> = HashMap::new();
    let mut no_wallets: HashMap<&str, (u128, u32)> = HashMap::new();
    let mut unique_wallets: HashSet<&str> = HashSet::new();

    for record in records {
        let side = match record.vote_type {
            VoteType::Yes => &mut yes_wallets,
            VoteType::No => &mut no_wallets,
        };
        let entry = side.entry(record.trader_wallet.as_str()).or_insert((0, 0));
        entry.0 += record.amount as u128;
        entry.1 += 1;
        unique_wallets.insert(record.trader_wallet.as_str());
    }

    let yes_holders = build_holder_list(&yes_wallets);
    let no_holders = build_holder_list(&no_wallets);

    let yes_stake: u128 = yes_wallets.values().map(|(total, _)| total).sum();
    let no_stake: u128 = no_wallets.values().map(|(total, _)| total).sum();

    Ok(HolderSummary {
        total_holders: yes_holders.len() + no_holders.len(),
        unique_holders: unique_wallets.len(),
        yes_holders,
        no_holders,
        total_yes_stake: lamports_to_display(yes_stake),
        total_no_stake: lamports_to_display(no_stake),
    })
}

/// Convert one side's wallet map into a sorted holder list
fn build_holder_list(wallets: &HashMap<&str, (u128, u32)>) -> Vec<HolderPosition> {
    let side_total: u128 = wallets.values().map(|(total, _)| total).sum();

    let mut holders: Vec<HolderPosition> = wallets
        .iter()
        .map(|(wallet, (total, count))| HolderPosition {
            wallet: wallet.to_string(),
            total_amount: lamports_to_display(*total),
            trade_count: *count,
            percentage: if side_total > 0 {
                100.0 * *total as f64 / side_total as f64
            } else {
                0.0
            },
        })
        .collect();

    holders.sort_by(|a, b| {
        b.total_amount
            .partial_cmp(&a.total_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.wallet.cmp(&b.wallet))
    });

    holders
}

fn lamports_to_display(lamports: u128) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;
    const BASE_MS: i64 = 1_700_000_000_000;

    fn trade(sig: &str, wallet: &str, vote: VoteType, lamports: i64, offset_secs: i64) -> TradeRecord {
        TradeRecord {
            signature: sig.to_string(),
            market_id: "market1".to_string(),
            trader_wallet: wallet.to_string(),
            vote_type: vote,
            amount: lamports,
            created_at: DateTime::from_timestamp_millis(BASE_MS + offset_secs * 1000).unwrap(),
        }
    }

    #[test]
    fn test_empty_records_empty_series() {
        let points = build_chart_series(&[], None).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_single_yes_trade_prices() {
        let records = vec![trade("s1", "A", VoteType::Yes, 1_000_000_000, 0)];
        let points = build_chart_series(&records, None).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].yes_price, 100.0);
        assert_eq!(points[0].no_price, 0.0);
        assert_eq!(points[0].amount, 1.0);
    }

    #[test]
    fn test_prices_are_complementary() {
        let records = vec![
            trade("s1", "A", VoteType::Yes, 3_000_000_000, 0),
            trade("s2", "B", VoteType::No, 1_000_000_000, 1),
            trade("s3", "C", VoteType::Yes, 7_500_000_000, 2),
            trade("s4", "A", VoteType::No, 2_250_000_000, 3),
        ];

        let points = build_chart_series(&records, None).unwrap();
        assert_eq!(points.len(), 4);
        for point in &points {
            assert!((point.yes_price + point.no_price - 100.0).abs() < EPS);
        }
    }

    #[test]
    fn test_same_side_trades_monotonic() {
        let records: Vec<TradeRecord> = (0..10i64)
            .map(|i| trade(&format!("s{}", i), "A", VoteType::No, 500_000_000, i))
            .collect();

        let points = build_chart_series(&records, None).unwrap();
        let mut prev = 0.0;
        for point in &points {
            assert!(point.no_price >= prev);
            assert!(point.no_price <= 100.0);
            prev = point.no_price;
        }
    }

    #[test]
    fn test_concrete_scenario() {
        let records = vec![
            trade("s1", "A", VoteType::Yes, 1_000_000_000, 1),
            trade("s2", "B", VoteType::No, 3_000_000_000, 2),
            trade("s3", "A", VoteType::Yes, 1_000_000_000, 3),
        ];

        let points = build_chart_series(&records, None).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!((points[0].yes_price, points[0].no_price), (100.0, 0.0));
        assert_eq!((points[1].yes_price, points[1].no_price), (25.0, 75.0));
        assert_eq!((points[2].yes_price, points[2].no_price), (40.0, 60.0));

        let summary = build_holder_summary(&records).unwrap();
        assert_eq!(summary.yes_holders.len(), 1);
        assert_eq!(summary.yes_holders[0].wallet, "A");
        assert_eq!(summary.yes_holders[0].total_amount, 2.0);
        assert_eq!(summary.yes_holders[0].trade_count, 2);
        assert_eq!(summary.yes_holders[0].percentage, 100.0);
        assert_eq!(summary.no_holders.len(), 1);
        assert_eq!(summary.no_holders[0].wallet, "B");
        assert_eq!(summary.no_holders[0].total_amount, 3.0);
        assert_eq!(summary.no_holders[0].trade_count, 1);
        assert_eq!(summary.no_holders[0].percentage, 100.0);
        assert_eq!(summary.unique_holders, 2);
        assert_eq!(summary.total_holders, 2);
    }

    #[test]
    fn test_caller_order_does_not_matter() {
        let ordered = vec![
            trade("s1", "A", VoteType::Yes, 1_000_000_000, 1),
            trade("s2", "B", VoteType::No, 3_000_000_000, 2),
            trade("s3", "A", VoteType::Yes, 1_000_000_000, 3),
        ];
        let shuffled = vec![ordered[2].clone(), ordered[0].clone(), ordered[1].clone()];

        assert_eq!(
            build_chart_series(&ordered, None).unwrap(),
            build_chart_series(&shuffled, None).unwrap()
        );
        assert_eq!(
            build_holder_summary(&ordered).unwrap(),
            build_holder_summary(&shuffled).unwrap()
        );
    }

    #[test]
    fn test_deterministic_output() {
        let records = vec![
            trade("s1", "A", VoteType::Yes, 2_000_000_000, 0),
            trade("s2", "B", VoteType::No, 1_000_000_000, 1),
        ];

        let first = serde_json::to_string(&build_chart_series(&records, None).unwrap()).unwrap();
        let second = serde_json::to_string(&build_chart_series(&records, None).unwrap()).unwrap();
        assert_eq!(first, second);

        let first = serde_json::to_string(&build_holder_summary(&records).unwrap()).unwrap();
        let second = serde_json::to_string(&build_holder_summary(&records).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_points_keeps_most_recent() {
        let records: Vec<TradeRecord> = (0..5i64)
            .map(|i| trade(&format!("s{}", i), "A", VoteType::Yes, 1_000_000_000, i))
            .collect();

        let points = build_chart_series(&records, Some(3)).unwrap();
        assert_eq!(points.len(), 3);
        // Oldest two trades fall outside the window, so the running sum
        // restarts from the third trade onward.
        assert_eq!(points[0].timestamp, records[2].created_at);
        assert_eq!(points[2].timestamp, records[4].created_at);
        assert_eq!(points[0].yes_price, 100.0);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let records = vec![
            trade("good", "A", VoteType::Yes, 1_000_000_000, 0),
            trade("bad", "B", VoteType::No, -5, 1),
        ];

        let err = build_chart_series(&records, None).unwrap_err();
        let AggregatorError::InvalidRecord { signature, .. } = err;
        assert_eq!(signature, "bad");

        assert!(build_holder_summary(&records).is_err());
        assert!(build_recent_trades(&records).is_err());
    }

    #[test]
    fn test_missing_wallet_rejected() {
        let records = vec![trade("s1", "", VoteType::Yes, 1_000_000_000, 0)];
        assert!(build_chart_series(&records, None).is_err());
    }

    #[test]
    fn test_holder_percentages_sum_to_100() {
        let records = vec![
            trade("s1", "A", VoteType::Yes, 1_000_000_000, 0),
            trade("s2", "B", VoteType::Yes, 2_000_000_000, 1),
            trade("s3", "C", VoteType::Yes, 4_000_000_000, 2),
            trade("s4", "A", VoteType::Yes, 500_000_000, 3),
        ];

        let summary = build_holder_summary(&records).unwrap();
        let sum: f64 = summary.yes_holders.iter().map(|h| h.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6);
        assert!(summary.no_holders.is_empty());
        assert_eq!(summary.total_no_stake, 0.0);
    }

    #[test]
    fn test_holders_sorted_with_lexical_tie_break() {
        let records = vec![
            trade("s1", "charlie", VoteType::Yes, 1_000_000_000, 0),
            trade("s2", "alice", VoteType::Yes, 1_000_000_000, 1),
            trade("s3", "bob", VoteType::Yes, 5_000_000_000, 2),
        ];

        let summary = build_holder_summary(&records).unwrap();
        let wallets: Vec<&str> = summary.yes_holders.iter().map(|h| h.wallet.as_str()).collect();
        assert_eq!(wallets, vec!["bob", "alice", "charlie"]);
    }

    #[test]
    fn test_wallet_on_both_sides() {
        let records = vec![
            trade("s1", "A", VoteType::Yes, 1_000_000_000, 0),
            trade("s2", "A", VoteType::No, 2_000_000_000, 1),
            trade("s3", "B", VoteType::No, 1_000_000_000, 2),
        ];

        let summary = build_holder_summary(&records).unwrap();
        assert_eq!(summary.yes_holders.len(), 1);
        assert_eq!(summary.no_holders.len(), 2);
        assert_eq!(summary.total_holders, 3);
        assert_eq!(summary.unique_holders, 2);
    }

    #[test]
    fn test_recent_trades_newest_first() {
        let records = vec![
            trade("s1", "A", VoteType::Yes, 1_000_000_000, 0),
            trade("s2", "B", VoteType::No, 2_500_000_000, 10),
            trade("s3", "C", VoteType::Yes, 500_000_000, 5),
        ];

        let recent = build_recent_trades(&records).unwrap();
        let sigs: Vec<&str> = recent.iter().map(|t| t.signature.as_str()).collect();
        assert_eq!(sigs, vec!["s2", "s3", "s1"]);
        assert_eq!(recent[0].amount, 2.5);
    }
}
