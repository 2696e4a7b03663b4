//! Market lifecycle state for prediction launch markets

use serde::{Deserialize, Serialize};

/// Phase of a market's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketPhase {
    /// Trading is open and votes count toward resolution
    Prediction,
    /// Target pool reached and the founder extended the market; votes frozen
    Funding,
}

impl Default for MarketPhase {
    fn default() -> Self {
        MarketPhase::Prediction
    }
}

/// Resolution status of a market
///
/// Resolution compares total YES stake against total NO stake at expiry:
/// the larger side wins, an exact tie (including no participation) refunds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarketResolution {
    /// Market is still active
    Unresolved,
    /// YES wins - the project token launches
    YesWins,
    /// NO wins - stakes are redistributed to NO voters
    NoWins,
    /// Tie or failed target - full refund
    Refund,
}

impl MarketResolution {
    /// Determine the outcome implied by the current stake totals
    pub fn from_stakes(yes_stake: u128, no_stake: u128) -> Self {
        if yes_stake > no_stake {
            MarketResolution::YesWins
        } else if no_stake > yes_stake {
            MarketResolution::NoWins
        } else {
            MarketResolution::Refund
        }
    }
}

impl Default for MarketResolution {
    fn default() -> Self {
        MarketResolution::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_from_stakes() {
        assert_eq!(
            MarketResolution::from_stakes(10, 5),
            MarketResolution::YesWins
        );
        assert_eq!(
            MarketResolution::from_stakes(5, 10),
            MarketResolution::NoWins
        );
        assert_eq!(MarketResolution::from_stakes(7, 7), MarketResolution::Refund);
        assert_eq!(MarketResolution::from_stakes(0, 0), MarketResolution::Refund);
    }
}
