//! Market Summary
//!
//! Derived per-market stake totals and the resolution the current stakes
//! imply. Like the rest of the aggregation layer this is a pure view over
//! the trade records it is handed.

use serde::{Deserialize, Serialize};

use plp_core::{MarketResolution, TradeRecord, VoteType};

use crate::trade_aggregator::AggregatorError;

/// Stake totals and projected outcome for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub market_id: String,
    /// Total YES stake in display units (SOL)
    pub total_yes_stake: f64,
    /// Total NO stake in display units (SOL)
    pub total_no_stake: f64,
    pub yes_trades: u32,
    pub no_trades: u32,
    /// Outcome implied by current stakes: larger side wins, a tie refunds
    pub projected_resolution: MarketResolution,
}

/// Build the stake summary for a market
pub fn build_market_summary(
    market_id: &str,
    records: &[TradeRecord],
) -> Result<MarketSummary, AggregatorError> {
    let mut yes_stake: u128 = 0;
    let mut no_stake: u128 = 0;
    let mut yes_trades: u32 = 0;
    let mut no_trades: u32 = 0;

    for record in records {
        if let Some(reason) = record.validate() {
            return Err(AggregatorError::InvalidRecord {
                signature: record.signature.clone(),
                reason,
            });
        }

        match record.vote_type {
            VoteType::Yes => {
                yes_stake += record.amount as u128;
                yes_trades += 1;
            }
            VoteType::No => {
                no_stake += record.amount as u128;
                no_trades += 1;
            }
        }
    }

    Ok(MarketSummary {
        market_id: market_id.to_string(),
        total_yes_stake: yes_stake as f64 / plp_core::LAMPORTS_PER_SOL as f64,
        total_no_stake: no_stake as f64 / plp_core::LAMPORTS_PER_SOL as f64,
        yes_trades,
        no_trades,
        projected_resolution: MarketResolution::from_stakes(yes_stake, no_stake),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn trade(sig: &str, vote: VoteType, lamports: i64) -> TradeRecord {
        TradeRecord {
            signature: sig.to_string(),
            market_id: "market1".to_string(),
            trader_wallet: "wallet1".to_string(),
            vote_type: vote,
            amount: lamports,
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn test_summary_totals_and_resolution() {
        let records = vec![
            trade("s1", VoteType::Yes, 2_000_000_000),
            trade("s2", VoteType::No, 1_000_000_000),
            trade("s3", VoteType::Yes, 500_000_000),
        ];

        let summary = build_market_summary("market1", &records).unwrap();
        assert_eq!(summary.total_yes_stake, 2.5);
        assert_eq!(summary.total_no_stake, 1.0);
        assert_eq!(summary.yes_trades, 2);
        assert_eq!(summary.no_trades, 1);
        assert_eq!(summary.projected_resolution, MarketResolution::YesWins);
    }

    #[test]
    fn test_empty_market_is_refund() {
        let summary = build_market_summary("market1", &[]).unwrap();
        assert_eq!(summary.total_yes_stake, 0.0);
        assert_eq!(summary.projected_resolution, MarketResolution::Refund);
    }

    #[test]
    fn test_invalid_record_rejected() {
        let records = vec![trade("s1", VoteType::Yes, 0)];
        assert!(build_market_summary("market1", &records).is_err());
    }
}
