/// 입찰 단위와 경매 시간 규칙
/// 저장소나 시계에 의존하지 않는 순수 함수로만 구성된다
// region:    --- Imports
use chrono::{DateTime, Duration, Utc};

use super::model::AuctionStatus;
// endregion: --- Imports

// region:    --- Constants

/// 경매 최소 진행 시간 (24시간, ms)
pub const MIN_DURATION_MS: i64 = 24 * 60 * 60 * 1000;
/// 경매 최대 진행 시간 (72시간, ms)
pub const MAX_DURATION_MS: i64 = 72 * 60 * 60 * 1000;
/// 등록 후 수정 가능 시간 (1시간, ms)
pub const EDIT_WINDOW_MS: i64 = 60 * 60 * 1000;

// endregion: --- Constants

// region:    --- Bid Rules

/// 현재 가격에 대한 최소 입찰 단위
/// 음수 입력은 검증 대상이 아니라 0으로 보정한다 (요청 자체의 검증은 호출자 몫)
pub fn bid_increment(price: i64) -> i64 {
    let price = price.max(0);
    if price <= 50_000 {
        1_000
    } else if price <= 200_000 {
        2_000
    } else if price <= 1_000_000 {
        5_000
    } else {
        10_000
    }
}

/// 다음 입찰의 최소 금액. 현재 가격보다 항상 크다
pub fn minimum_bid(current_price: i64) -> i64 {
    current_price.max(0) + bid_increment(current_price)
}

/// 입찰 금액 검증
/// 현재 가격과의 차액이 입찰 단위 이상이면서 단위의 정확한 배수여야 한다.
/// 단위는 제시된 입찰가가 아니라 현재 가격의 구간에서 정해진다.
pub fn is_bid_amount_valid(current_price: i64, bid_amount: i64) -> bool {
    let current = current_price.max(0);
    let increment = bid_increment(current);
    let diff = bid_amount - current;
    diff >= increment && diff % increment == 0
}

/// 경매 진행 시간 검증: 종료 시각이 기준 시각으로부터 24~72시간 이내 (경계 포함)
pub fn is_auction_duration_valid(end_at: DateTime<Utc>, base: DateTime<Utc>) -> bool {
    let ms = (end_at - base).num_milliseconds();
    (MIN_DURATION_MS..=MAX_DURATION_MS).contains(&ms)
}

/// 수정 마감 시각
pub fn edit_deadline(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::milliseconds(EDIT_WINDOW_MS)
}

/// 수정 가능 여부
/// 소유자이고, 진행중이며, 입찰이 하나도 없고, 등록 후 1시간 이내일 때만 가능하다
pub fn can_edit_auction(
    is_owner: bool,
    created_at: DateTime<Utc>,
    status: AuctionStatus,
    bid_count: i64,
    now: DateTime<Utc>,
) -> bool {
    is_owner
        && status == AuctionStatus::Active
        && bid_count == 0
        && now <= edit_deadline(created_at)
}

// endregion: --- Bid Rules

// region:    --- Tests


// endregion: --- Tests
