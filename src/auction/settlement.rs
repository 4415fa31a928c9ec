/// 만료 경매 정산
/// 진행중 상태에서 종료 시각이 지난 경매를 낙찰(ENDED) 또는 유찰(UNSOLD)로
/// 전환하고 알림 이벤트를 발행한다. 스케줄러가 주기적으로 호출하거나
/// 경매 상세 조회 시점에 해당 경매만 지정해서 호출한다.
// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::model::{Auction, AuctionStatus, Bid};
use crate::notification::{NotificationEvent, NotificationKind, NotificationSink};
// endregion: --- Imports

// region:    --- Auction Store Trait

/// 정산에 필요한 저장소 인터페이스
#[async_trait]
pub trait AuctionStore {
    /// 종료 시각이 지난 진행중 경매 조회 (특정 경매 하나로 한정 가능)
    async fn find_active_expired(
        &self,
        now: DateTime<Utc>,
        auction_id: Option<i64>,
    ) -> Result<Vec<Auction>, String>;

    /// 최고 입찰 조회 (금액 내림차순, 동일 금액은 먼저 입찰한 순)
    async fn find_top_bid(&self, auction_id: i64) -> Result<Option<Bid>, String>;

    /// 진행중일 때만 상태를 전환하는 조건부 갱신. 영향받은 행 수를 반환한다
    async fn transition_if_active(
        &self,
        auction_id: i64,
        status: AuctionStatus,
        winner_id: Option<i64>,
    ) -> Result<u64, String>;
}

// endregion: --- Auction Store Trait

// region:    --- Winner Selection

/// 낙찰자 선정: 최고 금액, 동일 금액이면 먼저 입찰한 쪽이 이긴다
/// (Postgres 구현은 같은 정책을 ORDER BY amount DESC, created_at ASC 로 표현한다)
pub fn select_winner(bids: &[Bid]) -> Option<&Bid> {
    bids.iter()
        .min_by_key(|b| (std::cmp::Reverse(b.amount), b.created_at))
}

// endregion: --- Winner Selection

// region:    --- Settlement Sweep

/// 만료 경매 일괄 정산
/// 경매별로 독립적으로 처리하며 한 경매의 실패가 나머지를 중단시키지 않는다.
/// 실제로 상태가 전환된 경매 수를 반환한다. 다른 호출자가 먼저 정산해서
/// 조건부 갱신이 0행을 반환한 경매는 세지 않는다.
pub async fn settle_expired(
    store: &impl AuctionStore,
    sink: &impl NotificationSink,
    now: DateTime<Utc>,
    auction_id: Option<i64>,
) -> u64 {
    let expired = match store.find_active_expired(now, auction_id).await {
        Ok(list) => list,
        Err(e) => {
            error!("{:<12} --> 만료 경매 조회 실패: {}", "Settlement", e);
            return 0;
        }
    };

    let mut settled = 0u64;
    for auction in expired {
        match settle_one(store, sink, &auction).await {
            Ok(true) => settled += 1,
            // 다른 프로세스가 먼저 정산한 경매는 조용히 건너뛴다
            Ok(false) => {}
            Err(e) => {
                error!("{:<12} --> 경매 {} 정산 실패: {}", "Settlement", auction.id, e);
            }
        }
    }
    settled
}

/// 경매 하나 정산. 상태 전환이 실제로 일어났으면 true
async fn settle_one(
    store: &impl AuctionStore,
    sink: &impl NotificationSink,
    auction: &Auction,
) -> Result<bool, String> {
    let top_bid = store.find_top_bid(auction.id).await?;
    let (status, winner_id) = match &top_bid {
        Some(bid) => (AuctionStatus::Ended, Some(bid.bidder_id)),
        None => (AuctionStatus::Unsold, None),
    };

    // 진행중일 때만 전환되는 조건부 갱신. 읽고-쓰기 쌍이 아니므로 동시 호출에도 안전하다
    let affected = store
        .transition_if_active(auction.id, status, winner_id)
        .await?;
    if affected == 0 {
        return Ok(false);
    }

    info!(
        "{:<12} --> 경매 {} 정산 완료: {}",
        "Settlement",
        auction.id,
        status.as_str()
    );

    match &top_bid {
        Some(bid) => {
            // 낙찰자에게 알림
            notify_quiet(
                sink,
                NotificationEvent {
                    kind: NotificationKind::AuctionWon,
                    recipient_id: bid.bidder_id,
                    sender_id: Some(auction.owner_id),
                    target_id: auction.id,
                    target_type: "auction",
                    price: Some(bid.amount),
                    dedupe: true,
                    allow_self: false,
                },
            )
            .await;
            // 판매자에게 알림
            notify_quiet(
                sink,
                NotificationEvent {
                    kind: NotificationKind::AuctionEnded,
                    recipient_id: auction.owner_id,
                    sender_id: Some(bid.bidder_id),
                    target_id: auction.id,
                    target_type: "auction",
                    price: Some(bid.amount),
                    dedupe: true,
                    allow_self: false,
                },
            )
            .await;
        }
        None => {
            // 유찰은 상대방이 없으므로 본인 알림을 허용한다
            notify_quiet(
                sink,
                NotificationEvent {
                    kind: NotificationKind::AuctionUnsold,
                    recipient_id: auction.owner_id,
                    sender_id: None,
                    target_id: auction.id,
                    target_type: "auction",
                    price: None,
                    dedupe: true,
                    allow_self: true,
                },
            )
            .await;
        }
    }
    Ok(true)
}

/// 알림 실패는 기록만 하고 정산 자체를 되돌리지 않는다
async fn notify_quiet(sink: &impl NotificationSink, event: NotificationEvent) {
    if let Err(e) = sink.notify(event).await {
        error!("{:<12} --> 알림 발행 실패: {}", "Settlement", e);
    }
}

// endregion: --- Settlement Sweep

// region:    --- Tests


// endregion: --- Tests
