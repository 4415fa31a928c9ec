use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// region:    --- Auction Status

/// 경매 상태
/// 진행중(ACTIVE)에서 낙찰(ENDED), 유찰(UNSOLD), 취소(CANCELLED)로만 전환된다
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Active,
    Ended,
    Unsold,
    Cancelled,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Active => "ACTIVE",
            AuctionStatus::Ended => "ENDED",
            AuctionStatus::Unsold => "UNSOLD",
            AuctionStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(AuctionStatus::Active),
            "ENDED" => Some(AuctionStatus::Ended),
            "UNSOLD" => Some(AuctionStatus::Unsold),
            "CANCELLED" => Some(AuctionStatus::Cancelled),
            _ => None,
        }
    }
}

// endregion: --- Auction Status

// region:    --- Models

/// 경매 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub photos: Vec<String>,
    pub category: String,
    pub starting_price: i64,
    pub current_price: i64,
    pub status: String,
    pub owner_id: i64,
    pub winner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl Auction {
    /// 상태 문자열을 열거형으로 변환 (알 수 없는 값은 None)
    pub fn status(&self) -> Option<AuctionStatus> {
        AuctionStatus::parse(&self.status)
    }
}

/// 입찰 모델
/// 경매의 현재 가격 갱신과 같은 트랜잭션에서 생성되며 이후 불변
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

// endregion: --- Models

// region:    --- Reject

/// 거절 사유 코드
/// 코어는 코드만 결정하고 사용자 메시지 변환은 표현 계층에서 한다
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reject {
    InvalidDuration,
    InvalidBidAmount { minimum: i64 },
    SellerRestricted,
    ContactRequired,
    ActiveLimitExceeded,
    SelfBid,
    AlreadyTopBidder,
    AccountTooNew,
    AlreadyEnded,
    NotActive,
    EditNotAllowed,
    NotOwner,
    HasBids,
    MaxRetriesExceeded,
    Internal(String),
}

impl Reject {
    pub fn code(&self) -> &'static str {
        match self {
            Reject::InvalidDuration => "INVALID_DURATION",
            Reject::InvalidBidAmount { .. } => "INVALID_BID_AMOUNT",
            Reject::SellerRestricted => "SELLER_RESTRICTED",
            Reject::ContactRequired => "CONTACT_REQUIRED",
            Reject::ActiveLimitExceeded => "ACTIVE_LIMIT_EXCEEDED",
            Reject::SelfBid => "SELF_BID",
            Reject::AlreadyTopBidder => "ALREADY_TOP_BIDDER",
            Reject::AccountTooNew => "ACCOUNT_TOO_NEW",
            Reject::AlreadyEnded => "ALREADY_ENDED",
            Reject::NotActive => "NOT_ACTIVE",
            Reject::EditNotAllowed => "EDIT_NOT_ALLOWED",
            Reject::NotOwner => "NOT_OWNER",
            Reject::HasBids => "HAS_BIDS",
            Reject::MaxRetriesExceeded => "MAX_RETRIES_EXCEEDED",
            Reject::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Reject::InvalidDuration => {
                "경매 기간은 24시간 이상 72시간 이하여야 합니다.".to_string()
            }
            Reject::InvalidBidAmount { minimum } => {
                format!("입찰 금액이 올바르지 않습니다. 최소 입찰 금액은 {}원입니다.", minimum)
            }
            Reject::SellerRestricted => "제한된 계정은 경매를 등록할 수 없습니다.".to_string(),
            Reject::ContactRequired => {
                "고가 경매 등록에는 인증된 연락처(휴대폰 또는 이메일)가 필요합니다.".to_string()
            }
            Reject::ActiveLimitExceeded => {
                "동시에 진행할 수 있는 경매 수를 초과했습니다.".to_string()
            }
            Reject::SelfBid => "본인의 경매에는 입찰할 수 없습니다.".to_string(),
            Reject::AlreadyTopBidder => "이미 최고 입찰자입니다.".to_string(),
            Reject::AccountTooNew => "가입 후 24시간이 지나야 입찰할 수 있습니다.".to_string(),
            Reject::AlreadyEnded => "경매가 이미 종료되었습니다.".to_string(),
            Reject::NotActive => "진행중인 경매가 아닙니다.".to_string(),
            Reject::EditNotAllowed => {
                "입찰이 없는 경매만 등록 후 1시간 이내에 수정할 수 있습니다.".to_string()
            }
            Reject::NotOwner => "경매 소유자만 할 수 있는 작업입니다.".to_string(),
            Reject::HasBids => "입찰이 있는 경매는 취소할 수 없습니다.".to_string(),
            Reject::MaxRetriesExceeded => "최대 재시도 횟수 초과".to_string(),
            Reject::Internal(e) => e.clone(),
        }
    }
}

// endregion: --- Reject
