//! Core types for the PLP prediction launch platform
//!
//! This crate defines the shared data structures used across the platform,
//! including trade records, market state, and the common error type.

pub mod error;
pub mod market;
pub mod trade;

pub use error::{PlpError, PlpResult};
pub use market::{MarketPhase, MarketResolution};
pub use trade::{TradeRecord, VoteType, LAMPORTS_PER_SOL};
