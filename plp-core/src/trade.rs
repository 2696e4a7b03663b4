//! Trade records for prediction markets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lamports per SOL, the divisor for converting on-chain amounts to display units
pub const LAMPORTS_PER_SOL: i64 = 1_000_000_000;

/// Side of a prediction market vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteType {
    /// Staked on the project launching
    Yes,
    /// Staked against the project launching
    No,
}

impl VoteType {
    /// Get the canonical string representation (as stored on-chain events)
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Yes => "YES",
            VoteType::No => "NO",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "YES" => Ok(VoteType::Yes),
            "NO" => Ok(VoteType::No),
            _ => Err(format!("Unknown vote type: {}", s)),
        }
    }
}

/// A single confirmed stake placed on one side of a market
///
/// Records are immutable once written; the set of records for a market is
/// the sole source of truth for all derived views (chart series, holder
/// summaries, stake totals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    /// Transaction signature, unique per trade
    pub signature: String,

    /// Market this trade belongs to
    pub market_id: String,

    /// Wallet address of the participant
    pub trader_wallet: String,

    /// Which side the stake was placed on
    pub vote_type: VoteType,

    /// Stake in lamports. Stored signed because upstream stores hand back
    /// signed integers; anything non-positive fails validation.
    pub amount: i64,

    /// When the trade was confirmed (millisecond precision)
    pub created_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Check basic validity of the record
    ///
    /// Returns the reason a record is unusable, or `None` if it is fine.
    /// A non-positive amount or a missing wallet would corrupt every running
    /// sum and stake total downstream, so consumers reject the whole batch.
    pub fn validate(&self) -> Option<String> {
        if self.trader_wallet.is_empty() {
            return Some("missing trader wallet".to_string());
        }
        if self.amount <= 0 {
            return Some(format!("amount must be positive, got {}", self.amount));
        }
        None
    }

    /// Stake converted from lamports to display units (SOL)
    pub fn display_amount(&self) -> f64 {
        self.amount as f64 / LAMPORTS_PER_SOL as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: i64, wallet: &str) -> TradeRecord {
        TradeRecord {
            signature: "sig1".to_string(),
            market_id: "market1".to_string(),
            trader_wallet: wallet.to_string(),
            vote_type: VoteType::Yes,
            amount,
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn test_vote_type_parsing() {
        assert_eq!("YES".parse::<VoteType>(), Ok(VoteType::Yes));
        assert_eq!("no".parse::<VoteType>(), Ok(VoteType::No));
        assert!("maybe".parse::<VoteType>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        assert!(record(1_000_000_000, "A").validate().is_none());
        assert!(record(0, "A").validate().is_some());
        assert!(record(-5, "A").validate().is_some());
        assert!(record(1_000_000_000, "").validate().is_some());
    }

    #[test]
    fn test_display_amount() {
        assert_eq!(record(1_000_000_000, "A").display_amount(), 1.0);
        assert_eq!(record(250_000_000, "A").display_amount(), 0.25);
    }
}
