// region:    --- Imports
use crate::auction::commands::{
    self, BidderProfile, CancelAuctionCommand, CreateAuctionCommand, EditAuctionCommand,
    PlaceBidCommand,
};
use crate::auction::model::Reject;
use crate::auction::rules;
use crate::auction::settlement::settle_expired;
use crate::database::{DatabaseManager, PostgresAuctionStore};
use crate::message_broker::KafkaProducer;
use crate::notification::PostgresNotificationSink;
use crate::query;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

pub type AppState = (Arc<DatabaseManager>, Arc<KafkaProducer>);

// region:    --- Error Mapping

/// 거절 사유를 응답으로 변환
/// 코어는 사유 코드만 결정하고 사용자 메시지는 여기서 붙인다
fn reject_response(reject: Reject) -> Response {
    match &reject {
        Reject::Internal(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": e,
                "code": reject.code(),
            })),
        )
            .into_response(),
        Reject::InvalidBidAmount { minimum } => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": reject.message(),
                "code": reject.code(),
                "minimum_bid": minimum,
            })),
        )
            .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": reject.message(),
                "code": reject.code(),
            })),
        )
            .into_response(),
    }
}

/// 조회 오류를 응답으로 변환
fn query_error(e: sqlx::Error) -> Response {
    match e {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "경매를 찾을 수 없습니다.",
                "code": "NOT_FOUND",
            })),
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": e.to_string(),
                "code": "INTERNAL_ERROR",
            })),
        )
            .into_response(),
    }
}

// endregion: --- Error Mapping

// region:    --- Command Handlers

/// 경매 등록 요청 처리
pub async fn handle_create_auction(
    State((db_manager, _)): State<AppState>,
    Json(cmd): Json<CreateAuctionCommand>,
) -> impl IntoResponse {
    info!("{:<12} --> 경매 등록 요청: 사용자 {}", "Handler", cmd.owner_id);
    match commands::handle_create_auction(cmd, &db_manager, Utc::now()).await {
        Ok(auction) => (StatusCode::CREATED, Json(auction)).into_response(),
        Err(reject) => reject_response(reject),
    }
}

/// 입찰 요청 바디
#[derive(Debug, Deserialize)]
pub struct BidRequest {
    pub bidder_id: i64,
    pub amount: i64,
    pub bidder: BidderProfile,
}

/// 입찰 요청 처리
pub async fn handle_place_bid(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<BidRequest>,
) -> impl IntoResponse {
    info!(
        "{:<12} --> 입찰 요청: 경매 {}, 사용자 {}",
        "Handler", auction_id, req.bidder_id
    );
    let cmd = PlaceBidCommand {
        auction_id,
        bidder_id: req.bidder_id,
        amount: req.amount,
        bidder: req.bidder,
    };
    match commands::handle_place_bid(cmd, &db_manager, Utc::now()).await {
        Ok(current_price) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "입찰이 성공적으로 처리되었습니다.",
                "current_price": current_price,
            })),
        )
            .into_response(),
        Err(reject) => reject_response(reject),
    }
}

/// 경매 수정 요청 바디
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub owner_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub photos: Option<Vec<String>>,
    pub category: Option<String>,
    pub starting_price: Option<i64>,
    pub end_at: Option<DateTime<Utc>>,
}

/// 경매 수정 요청 처리
pub async fn handle_edit_auction(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<EditRequest>,
) -> impl IntoResponse {
    info!("{:<12} --> 경매 수정 요청: {}", "Handler", auction_id);
    let cmd = EditAuctionCommand {
        auction_id,
        owner_id: req.owner_id,
        title: req.title,
        description: req.description,
        photos: req.photos,
        category: req.category,
        starting_price: req.starting_price,
        end_at: req.end_at,
    };
    match commands::handle_edit_auction(cmd, &db_manager, Utc::now()).await {
        Ok(auction) => Json(auction).into_response(),
        Err(reject) => reject_response(reject),
    }
}

/// 경매 취소 요청 바디
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub owner_id: i64,
}

/// 경매 취소 요청 처리
pub async fn handle_cancel_auction(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<CancelRequest>,
) -> impl IntoResponse {
    info!("{:<12} --> 경매 취소 요청: {}", "Handler", auction_id);
    let cmd = CancelAuctionCommand {
        auction_id,
        owner_id: req.owner_id,
    };
    match commands::handle_cancel_auction(cmd, &db_manager).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "경매가 취소되었습니다." })),
        )
            .into_response(),
        Err(reject) => reject_response(reject),
    }
}

/// 정산 수동 실행 요청 처리
pub async fn handle_run_settlement(
    State((db_manager, kafka_producer)): State<AppState>,
) -> impl IntoResponse {
    info!("{:<12} --> 정산 수동 실행", "Handler");
    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let sink = PostgresNotificationSink::new(db_manager.get_pool(), Arc::clone(&kafka_producer));
    let settled = settle_expired(&store, &sink, Utc::now(), None).await;
    Json(serde_json::json!({ "settled": settled })).into_response()
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 경매 조회
/// 조회 시점에 해당 경매가 만료되어 있으면 먼저 정산한다
pub async fn handle_get_auction(
    State((db_manager, kafka_producer)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 경매 조회 id: {}", "Handler", auction_id);

    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let sink = PostgresNotificationSink::new(db_manager.get_pool(), Arc::clone(&kafka_producer));
    settle_expired(&store, &sink, Utc::now(), Some(auction_id)).await;

    match query::handlers::get_auction(&db_manager, auction_id).await {
        Ok(auction) => Json(auction).into_response(),
        Err(e) => query_error(e),
    }
}

/// 모든 경매 조회
pub async fn handle_get_auctions(
    State((db_manager, _)): State<AppState>,
) -> impl IntoResponse {
    info!("{:<12} --> 모든 경매 조회", "Handler");
    match query::handlers::get_all_auctions(&db_manager).await {
        Ok(auctions) => Json(auctions).into_response(),
        Err(e) => query_error(e),
    }
}

/// 입찰 이력 조회
pub async fn handle_get_auction_bids(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Handler", auction_id);
    match query::handlers::get_auction_bids(&db_manager, auction_id).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => query_error(e),
    }
}

/// 최소 입찰 금액 조회
pub async fn handle_get_minimum_bid(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> impl IntoResponse {
    info!("{:<12} --> 최소 입찰 금액 조회 id: {}", "Handler", auction_id);
    match query::handlers::get_auction(&db_manager, auction_id).await {
        Ok(auction) => Json(serde_json::json!({
            "current_price": auction.current_price,
            "bid_increment": rules::bid_increment(auction.current_price),
            "minimum_bid": rules::minimum_bid(auction.current_price),
        }))
        .into_response(),
        Err(e) => query_error(e),
    }
}

// endregion: --- Query Handlers

// region:    --- Tests


// endregion: --- Tests
