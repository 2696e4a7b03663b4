//! Business logic services for the PLP prediction launch platform
//!
//! This crate provides the aggregation layer that turns stored trade
//! records into chart series, holder summaries, and market stake views.

pub mod market_summary;
pub mod trade_aggregator;
pub mod trade_storage;

pub use market_summary::{build_market_summary, MarketSummary};
pub use trade_aggregator::{
    build_chart_series, build_holder_summary, build_recent_trades, AggregatorError, ChartPoint,
    HolderPosition, HolderSummary, RecentTrade, DEFAULT_CHART_POINTS,
};
pub use trade_storage::{TradeStorage, TradeStorageError};
