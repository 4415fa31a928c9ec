/// 경매 관련 커맨드 처리
/// 1. 경매 등록
/// 2. 입찰
/// 3. 경매 수정
/// 4. 경매 취소
// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auction::eligibility::{self, BidContext, CreateContext};
use crate::auction::model::{Auction, AuctionStatus, Reject};
use crate::auction::rules;
use crate::database::DatabaseManager;
use crate::query::{handlers as query_handlers, queries};
// endregion: --- Imports

// region:    --- Commands

/// 판매자 계정 스냅샷 (사용자 서비스가 제공)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SellerProfile {
    pub restricted: bool,
    pub has_verified_contact: bool,
}

/// 입찰자 계정 스냅샷 (사용자 서비스가 제공)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BidderProfile {
    pub joined_at: DateTime<Utc>,
}

/// 경매 등록 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateAuctionCommand {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub photos: Vec<String>,
    pub category: String,
    pub starting_price: i64,
    pub end_at: DateTime<Utc>,
    pub seller: SellerProfile,
}

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub bidder: BidderProfile,
}

/// 경매 수정 명령 (생략된 필드는 기존 값 유지)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EditAuctionCommand {
    pub auction_id: i64,
    pub owner_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub photos: Option<Vec<String>>,
    pub category: Option<String>,
    pub starting_price: Option<i64>,
    pub end_at: Option<DateTime<Utc>>,
}

/// 경매 취소 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CancelAuctionCommand {
    pub auction_id: i64,
    pub owner_id: i64,
}

// 최대 재시도 횟수
const MAX_RETRIES: i32 = 100;

/// 1. 경매 등록
pub async fn handle_create_auction(
    cmd: CreateAuctionCommand,
    db_manager: &DatabaseManager,
    now: DateTime<Utc>,
) -> Result<Auction, Reject> {
    info!(
        "{:<12} --> 경매 등록 요청 처리 시작: 사용자 {}",
        "Command", cmd.owner_id
    );

    if !rules::is_auction_duration_valid(cmd.end_at, now) {
        return Err(Reject::InvalidDuration);
    }

    // 방어적 보정: 음수 시작가는 0으로 처리
    let starting_price = cmd.starting_price.max(0);

    let active_count = query_handlers::count_active_by_owner(db_manager, cmd.owner_id)
        .await
        .map_err(|e| Reject::Internal(e.to_string()))?;

    eligibility::check_create_eligibility(&CreateContext {
        seller_restricted: cmd.seller.restricted,
        has_verified_contact: cmd.seller.has_verified_contact,
        starting_price,
        active_auction_count: active_count,
    })?;

    let auction = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::INSERT_AUCTION)
                    .bind(&cmd.title)
                    .bind(&cmd.description)
                    .bind(&cmd.photos)
                    .bind(&cmd.category)
                    .bind(starting_price)
                    .bind(starting_price)
                    .bind(AuctionStatus::Active.as_str())
                    .bind(cmd.owner_id)
                    .bind(now)
                    .bind(cmd.end_at)
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
        .map_err(|e: sqlx::Error| Reject::Internal(e.to_string()))?;

    info!("{:<12} --> 경매 등록 완료: {}", "Command", auction.id);
    Ok(auction)
}

/// 2. 입찰
/// 입찰 금액 검증은 커밋 시점의 현재 가격을 기준으로 해야 하므로,
/// 읽었던 가격 그대로일 때만 반영되는 조건부 갱신과 입찰 기록을
/// 한 트랜잭션으로 묶고 충돌 시 최신 가격으로 재검증한다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    db_manager: &DatabaseManager,
    now: DateTime<Utc>,
) -> Result<i64, Reject> {
    info!(
        "{:<12} --> 입찰 요청 처리 시작: 경매 {}, 사용자 {}",
        "Command", cmd.auction_id, cmd.bidder_id
    );
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let auction = query_handlers::get_auction(db_manager, cmd.auction_id)
            .await
            .map_err(|e| Reject::Internal(e.to_string()))?;
        let top_bid = query_handlers::get_top_bid(db_manager, cmd.auction_id)
            .await
            .map_err(|e| Reject::Internal(e.to_string()))?;

        eligibility::check_bid_eligibility(&BidContext {
            bidder_id: cmd.bidder_id,
            owner_id: auction.owner_id,
            top_bidder_id: top_bid.as_ref().map(|b| b.bidder_id),
            bidder_joined_at: cmd.bidder.joined_at,
            status: auction.status(),
            end_at: auction.end_at,
            now,
        })?;

        if !rules::is_bid_amount_valid(auction.current_price, cmd.amount) {
            return Err(Reject::InvalidBidAmount {
                minimum: rules::minimum_bid(auction.current_price),
            });
        }

        let expected = auction.current_price;
        let auction_id = cmd.auction_id;
        let bidder_id = cmd.bidder_id;
        let amount = cmd.amount;

        let applied = db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let result = sqlx::query(queries::CAS_UPDATE_PRICE)
                        .bind(amount)
                        .bind(auction_id)
                        .bind(expected)
                        .execute(&mut **tx)
                        .await?;
                    if result.rows_affected() == 0 {
                        return Ok(false);
                    }
                    sqlx::query(queries::INSERT_BID)
                        .bind(auction_id)
                        .bind(bidder_id)
                        .bind(amount)
                        .bind(now)
                        .execute(&mut **tx)
                        .await?;
                    Ok::<bool, sqlx::Error>(true)
                })
            })
            .await
            .map_err(|e: sqlx::Error| Reject::Internal(e.to_string()))?;

        if applied {
            info!(
                "{:<12} --> 입찰 완료: 경매 {}, 현재 가격 {}",
                "Command", auction_id, amount
            );
            return Ok(amount);
        }

        // 다른 입찰이 먼저 반영됨: 최신 가격으로 다시 검증
        warn!("{:<12} --> 가격 변경으로 인한 충돌: 재시도", "Command");
        retries += 1;
    }

    Err(Reject::MaxRetriesExceeded)
}

/// 3. 경매 수정
pub async fn handle_edit_auction(
    cmd: EditAuctionCommand,
    db_manager: &DatabaseManager,
    now: DateTime<Utc>,
) -> Result<Auction, Reject> {
    info!(
        "{:<12} --> 경매 수정 요청 처리 시작: {}",
        "Command", cmd.auction_id
    );

    let auction = query_handlers::get_auction(db_manager, cmd.auction_id)
        .await
        .map_err(|e| Reject::Internal(e.to_string()))?;
    let bid_count = query_handlers::count_bids(db_manager, cmd.auction_id)
        .await
        .map_err(|e| Reject::Internal(e.to_string()))?;

    let Some(status) = auction.status() else {
        return Err(Reject::NotActive);
    };
    if !rules::can_edit_auction(
        cmd.owner_id == auction.owner_id,
        auction.created_at,
        status,
        bid_count,
        now,
    ) {
        return Err(Reject::EditNotAllowed);
    }

    // 기간은 등록 시각 기준으로 다시 검증한다
    if let Some(end_at) = cmd.end_at {
        if !rules::is_auction_duration_valid(end_at, auction.created_at) {
            return Err(Reject::InvalidDuration);
        }
    }

    let auction_id = cmd.auction_id;
    let title = cmd.title.unwrap_or_else(|| auction.title.clone());
    let description = cmd.description.unwrap_or_else(|| auction.description.clone());
    let photos = cmd.photos.unwrap_or_else(|| auction.photos.clone());
    let category = cmd.category.unwrap_or_else(|| auction.category.clone());
    let starting_price = cmd.starting_price.map(|p| p.max(0)).unwrap_or(auction.starting_price);
    let end_at = cmd.end_at.unwrap_or(auction.end_at);

    let affected = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 입찰이 없으므로 현재 가격은 시작가와 같다.
                // 입찰 없음 조건은 쿼리 자체가 다시 확인한다
                let result = sqlx::query(queries::UPDATE_AUCTION)
                    .bind(&title)
                    .bind(&description)
                    .bind(&photos)
                    .bind(&category)
                    .bind(starting_price)
                    .bind(starting_price)
                    .bind(end_at)
                    .bind(auction_id)
                    .execute(&mut **tx)
                    .await?;
                Ok::<u64, sqlx::Error>(result.rows_affected())
            })
        })
        .await
        .map_err(|e: sqlx::Error| Reject::Internal(e.to_string()))?;

    // 입찰 수 확인 후 그 사이에 입찰이 들어왔거나 이미 정산된 경매
    if affected == 0 {
        return Err(Reject::EditNotAllowed);
    }

    query_handlers::get_auction(db_manager, cmd.auction_id)
        .await
        .map_err(|e| Reject::Internal(e.to_string()))
}

/// 4. 경매 취소
pub async fn handle_cancel_auction(
    cmd: CancelAuctionCommand,
    db_manager: &DatabaseManager,
) -> Result<(), Reject> {
    info!(
        "{:<12} --> 경매 취소 요청 처리 시작: {}",
        "Command", cmd.auction_id
    );

    let auction = query_handlers::get_auction(db_manager, cmd.auction_id)
        .await
        .map_err(|e| Reject::Internal(e.to_string()))?;
    if auction.owner_id != cmd.owner_id {
        return Err(Reject::NotOwner);
    }
    let bid_count = query_handlers::count_bids(db_manager, cmd.auction_id)
        .await
        .map_err(|e| Reject::Internal(e.to_string()))?;
    if bid_count > 0 {
        return Err(Reject::HasBids);
    }

    let auction_id = cmd.auction_id;
    let affected = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let result = sqlx::query(queries::CANCEL_AUCTION)
                    .bind(auction_id)
                    .execute(&mut **tx)
                    .await?;
                Ok::<u64, sqlx::Error>(result.rows_affected())
            })
        })
        .await
        .map_err(|e: sqlx::Error| Reject::Internal(e.to_string()))?;

    // 이미 정산이나 취소가 끝난 경매
    if affected == 0 {
        return Err(Reject::NotActive);
    }

    info!("{:<12} --> 경매 취소 완료: {}", "Command", cmd.auction_id);
    Ok(())
}

// endregion: --- Commands
