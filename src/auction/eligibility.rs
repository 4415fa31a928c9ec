/// 경매 등록과 입찰의 자격 검증
/// 호출자가 넘겨준 값만으로 판정하는 순수 술어이며 저장소를 직접 조회하지 않는다.
/// 계정 정보(제한 여부, 연락처 인증, 가입 시각)는 별도의 사용자 서비스가
/// 요청 시점 스냅샷으로 제공한다고 가정한다.
// region:    --- Imports
use chrono::{DateTime, Utc};

use super::model::{AuctionStatus, Reject};
// endregion: --- Imports

// region:    --- Constants

/// 연락처 인증이 필요한 고가 경매 기준 금액
pub const HIGH_PRICE_REQUIRE_CONTACT: i64 = 500_000;
/// 사용자당 동시 진행 가능 경매 수
pub const MAX_ACTIVE_PER_USER: i64 = 3;
/// 입찰 가능 최소 계정 나이 (24시간, ms)
pub const MIN_ACCOUNT_AGE_MS: i64 = 24 * 60 * 60 * 1000;

// endregion: --- Constants

// region:    --- Create Eligibility

/// 경매 등록 자격 입력
#[derive(Debug, Clone)]
pub struct CreateContext {
    pub seller_restricted: bool,
    pub has_verified_contact: bool,
    pub starting_price: i64,
    pub active_auction_count: i64,
}

/// 경매 등록 자격 검증
pub fn check_create_eligibility(ctx: &CreateContext) -> Result<(), Reject> {
    if ctx.seller_restricted {
        return Err(Reject::SellerRestricted);
    }
    if ctx.starting_price >= HIGH_PRICE_REQUIRE_CONTACT && !ctx.has_verified_contact {
        return Err(Reject::ContactRequired);
    }
    if ctx.active_auction_count >= MAX_ACTIVE_PER_USER {
        return Err(Reject::ActiveLimitExceeded);
    }
    Ok(())
}

// endregion: --- Create Eligibility

// region:    --- Bid Eligibility

/// 입찰 자격 입력
#[derive(Debug, Clone)]
pub struct BidContext {
    pub bidder_id: i64,
    pub owner_id: i64,
    /// 현재 최고 입찰자 (입찰이 없으면 None)
    pub top_bidder_id: Option<i64>,
    pub bidder_joined_at: DateTime<Utc>,
    /// 알 수 없는 상태 문자열은 None
    pub status: Option<AuctionStatus>,
    pub end_at: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

/// 입찰 자격 검증
pub fn check_bid_eligibility(ctx: &BidContext) -> Result<(), Reject> {
    match ctx.status {
        Some(AuctionStatus::Active) => {}
        Some(AuctionStatus::Ended) | Some(AuctionStatus::Unsold) => {
            return Err(Reject::AlreadyEnded)
        }
        _ => return Err(Reject::NotActive),
    }
    if ctx.now > ctx.end_at {
        return Err(Reject::AlreadyEnded);
    }
    if ctx.bidder_id == ctx.owner_id {
        return Err(Reject::SelfBid);
    }
    if ctx.top_bidder_id == Some(ctx.bidder_id) {
        return Err(Reject::AlreadyTopBidder);
    }
    if (ctx.now - ctx.bidder_joined_at).num_milliseconds() < MIN_ACCOUNT_AGE_MS {
        return Err(Reject::AccountTooNew);
    }
    Ok(())
}

// endregion: --- Bid Eligibility

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn create_ctx() -> CreateContext {
        CreateContext {
            seller_restricted: false,
            has_verified_contact: false,
            starting_price: 10_000,
            active_auction_count: 0,
        }
    }

    #[test]
    fn test_create_ok() {
        assert_eq!(check_create_eligibility(&create_ctx()), Ok(()));
    }

    #[test]
    fn test_create_restricted_seller() {
        let ctx = CreateContext { seller_restricted: true, ..create_ctx() };
        assert_eq!(check_create_eligibility(&ctx), Err(Reject::SellerRestricted));
    }

    #[test]
    fn test_create_high_price_requires_contact() {
        let ctx = CreateContext { starting_price: 500_000, ..create_ctx() };
        assert_eq!(check_create_eligibility(&ctx), Err(Reject::ContactRequired));

        // 기준 금액 미만이면 연락처 없이도 가능
        let ctx = CreateContext { starting_price: 499_999, ..create_ctx() };
        assert_eq!(check_create_eligibility(&ctx), Ok(()));

        // 연락처가 인증되어 있으면 고가 경매도 가능
        let ctx = CreateContext {
            starting_price: 500_000,
            has_verified_contact: true,
            ..create_ctx()
        };
        assert_eq!(check_create_eligibility(&ctx), Ok(()));
    }

    #[test]
    fn test_create_active_limit() {
        let ctx = CreateContext { active_auction_count: 3, ..create_ctx() };
        assert_eq!(check_create_eligibility(&ctx), Err(Reject::ActiveLimitExceeded));

        let ctx = CreateContext { active_auction_count: 2, ..create_ctx() };
        assert_eq!(check_create_eligibility(&ctx), Ok(()));
    }

    fn bid_ctx() -> BidContext {
        let now = t0();
        BidContext {
            bidder_id: 2,
            owner_id: 1,
            top_bidder_id: None,
            bidder_joined_at: now - Duration::days(30),
            status: Some(AuctionStatus::Active),
            end_at: now + Duration::hours(10),
            now,
        }
    }

    #[test]
    fn test_bid_ok() {
        assert_eq!(check_bid_eligibility(&bid_ctx()), Ok(()));
    }

    #[test]
    fn test_bid_self_bid() {
        let ctx = BidContext { bidder_id: 1, ..bid_ctx() };
        assert_eq!(check_bid_eligibility(&ctx), Err(Reject::SelfBid));
    }

    #[test]
    fn test_bid_already_top_bidder() {
        let ctx = BidContext { top_bidder_id: Some(2), ..bid_ctx() };
        assert_eq!(check_bid_eligibility(&ctx), Err(Reject::AlreadyTopBidder));

        // 다른 사람이 최고 입찰자면 다시 입찰 가능
        let ctx = BidContext { top_bidder_id: Some(3), ..bid_ctx() };
        assert_eq!(check_bid_eligibility(&ctx), Ok(()));
    }

    #[test]
    fn test_bid_account_too_new() {
        let base = bid_ctx();
        let ctx = BidContext { bidder_joined_at: base.now - Duration::hours(23), ..base.clone() };
        assert_eq!(check_bid_eligibility(&ctx), Err(Reject::AccountTooNew));

        let ctx = BidContext { bidder_joined_at: base.now - Duration::hours(24), ..base };
        assert_eq!(check_bid_eligibility(&ctx), Ok(()));
    }

    #[test]
    fn test_bid_expired_or_not_active() {
        let base = bid_ctx();
        let ctx = BidContext { end_at: base.now - Duration::seconds(1), ..base.clone() };
        assert_eq!(check_bid_eligibility(&ctx), Err(Reject::AlreadyEnded));

        let ctx = BidContext { status: Some(AuctionStatus::Ended), ..base.clone() };
        assert_eq!(check_bid_eligibility(&ctx), Err(Reject::AlreadyEnded));

        let ctx = BidContext { status: Some(AuctionStatus::Cancelled), ..base.clone() };
        assert_eq!(check_bid_eligibility(&ctx), Err(Reject::NotActive));

        let ctx = BidContext { status: None, ..base };
        assert_eq!(check_bid_eligibility(&ctx), Err(Reject::NotActive));
    }
}

// endregion: --- Tests
