//! Market trade-history API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use plp_core::{TradeRecord, VoteType};
use plp_services::{
    build_chart_series, build_holder_summary, build_market_summary, build_recent_trades,
    ChartPoint, HolderPosition, RecentTrade,
};

use crate::AppState;

/// Query limit for chart and recent-trades data
const CHART_TRADE_LIMIT: u32 = 100;

/// Query limit for holder aggregation
const HOLDER_TRADE_LIMIT: u32 = 1000;

/// Full trade-history report for one market
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeHistoryResponse {
    pub chart_data: Vec<ChartPoint>,
    pub recent_trades: Vec<RecentTrade>,
    pub total_trades: usize,
    pub yes_holders: Vec<HolderPosition>,
    pub no_holders: Vec<HolderPosition>,
    pub total_yes_stake: f64,
    pub total_no_stake: f64,
    pub total_holders: usize,
    pub unique_holders: usize,
}

/// Request body for recording a confirmed trade
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTradeRequest {
    pub signature: String,
    pub trader_wallet: String,
    pub vote_type: VoteType,
    /// Stake in lamports
    pub amount: i64,
    /// Defaults to the time of ingestion when omitted
    pub created_at: Option<DateTime<Utc>>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create market routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/markets/{market_id}/trades",
            get(get_trade_history).post(record_trade),
        )
        .route("/markets/{market_id}/summary", get(get_market_summary))
}

/// Get the trade-history report for a market
///
/// Chart and recent trades are derived from the 100 most recent records,
/// holders from the 1000 most recent. Aggregation failures are never
/// papered over with partial data; the whole request fails.
async fn get_trade_history(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
) -> impl IntoResponse {
    info!("Getting trade history for market {}", market_id);

    let recent = match state.trade_storage.recent_trades(&market_id, CHART_TRADE_LIMIT) {
        Ok(records) => records,
        Err(e) => return storage_error(&market_id, e),
    };
    let holder_records = match state
        .trade_storage
        .recent_trades(&market_id, HOLDER_TRADE_LIMIT)
    {
        Ok(records) => records,
        Err(e) => return storage_error(&market_id, e),
    };
    let total_trades = match state.trade_storage.trade_count(&market_id) {
        Ok(count) => count,
        Err(e) => return storage_error(&market_id, e),
    };

    let chart_data = match build_chart_series(&recent, Some(CHART_TRADE_LIMIT as usize)) {
        Ok(points) => points,
        Err(e) => return aggregation_error(&market_id, e),
    };
    let recent_trades = match build_recent_trades(&recent) {
        Ok(trades) => trades,
        Err(e) => return aggregation_error(&market_id, e),
    };
    let holders = match build_holder_summary(&holder_records) {
        Ok(summary) => summary,
        Err(e) => return aggregation_error(&market_id, e),
    };

    let response = TradeHistoryResponse {
        chart_data,
        recent_trades,
        total_trades,
        yes_holders: holders.yes_holders,
        no_holders: holders.no_holders,
        total_yes_stake: holders.total_yes_stake,
        total_no_stake: holders.total_no_stake,
        total_holders: holders.total_holders,
        unique_holders: holders.unique_holders,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Record a confirmed trade for a market
async fn record_trade(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
    Json(body): Json<RecordTradeRequest>,
) -> impl IntoResponse {
    let record = TradeRecord {
        signature: body.signature,
        market_id,
        trader_wallet: body.trader_wallet,
        vote_type: body.vote_type,
        amount: body.amount,
        created_at: body.created_at.unwrap_or_else(Utc::now),
    };

    if let Some(reason) = record.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("invalid trade record {}: {}", record.signature, reason),
            }),
        )
            .into_response();
    }

    match state.trade_storage.store_trade(&record) {
        Ok(()) => {
            info!(
                "Recorded trade {} for market {} ({} {} lamports)",
                record.signature, record.market_id, record.vote_type, record.amount
            );
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(e) => {
            error!("Failed to store trade for {}: {}", record.market_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Get stake totals and projected resolution for a market
async fn get_market_summary(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
) -> impl IntoResponse {
    let records = match state
        .trade_storage
        .recent_trades(&market_id, HOLDER_TRADE_LIMIT)
    {
        Ok(records) => records,
        Err(e) => return storage_error(&market_id, e),
    };

    match build_market_summary(&market_id, &records) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => aggregation_error(&market_id, e),
    }
}

fn storage_error(market_id: &str, e: plp_services::TradeStorageError) -> axum::response::Response {
    error!("Storage failure for market {}: {}", market_id, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Stored records failing aggregation means the store holds corrupt rows
fn aggregation_error(
    market_id: &str,
    e: plp_services::AggregatorError,
) -> axum::response::Response {
    error!("Aggregation failure for market {}: {}", market_id, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}
