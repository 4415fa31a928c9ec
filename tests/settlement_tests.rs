/// 정산 스윕 테스트
/// 메모리 저장소와 기록용 알림 싱크, 고정된 현재 시각으로 결정적으로 검증한다
use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use auction_house::auction::model::{Auction, AuctionStatus, Bid};
use auction_house::auction::settlement::{select_winner, settle_expired, AuctionStore};
use auction_house::notification::{
    dedupe_key, is_self_suppressed, NotificationEvent, NotificationKind, NotificationSink,
};

// region:    --- Test Doubles

/// 메모리 저장소
struct InMemoryStore {
    auctions: Mutex<Vec<Auction>>,
    bids: Vec<Bid>,
    /// 이 경매의 상태 전환은 저장소 오류를 낸다 (오류 격리 테스트용)
    fail_transition_for: Option<i64>,
}

impl InMemoryStore {
    fn new(auctions: Vec<Auction>, bids: Vec<Bid>) -> Self {
        Self {
            auctions: Mutex::new(auctions),
            bids,
            fail_transition_for: None,
        }
    }

    fn auction(&self, id: i64) -> Auction {
        self.auctions
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl AuctionStore for InMemoryStore {
    async fn find_active_expired(
        &self,
        now: DateTime<Utc>,
        auction_id: Option<i64>,
    ) -> Result<Vec<Auction>, String> {
        Ok(self
            .auctions
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.status == AuctionStatus::Active.as_str() && a.end_at <= now)
            .filter(|a| auction_id.map_or(true, |id| a.id == id))
            .cloned()
            .collect())
    }

    async fn find_top_bid(&self, auction_id: i64) -> Result<Option<Bid>, String> {
        let bids: Vec<Bid> = self
            .bids
            .iter()
            .filter(|b| b.auction_id == auction_id)
            .cloned()
            .collect();
        Ok(select_winner(&bids).cloned())
    }

    async fn transition_if_active(
        &self,
        auction_id: i64,
        status: AuctionStatus,
        winner_id: Option<i64>,
    ) -> Result<u64, String> {
        if self.fail_transition_for == Some(auction_id) {
            return Err("저장소 오류".to_string());
        }
        let mut auctions = self.auctions.lock().unwrap();
        let Some(auction) = auctions.iter_mut().find(|a| a.id == auction_id) else {
            return Ok(0);
        };
        // 진행중일 때만 전환되는 조건부 갱신
        if auction.status != AuctionStatus::Active.as_str() {
            return Ok(0);
        }
        auction.status = status.as_str().to_string();
        auction.winner_id = winner_id;
        Ok(1)
    }
}

/// 기록용 알림 싱크
/// 실제 싱크처럼 본인 알림 차단과 중복 확인 키를 따른다
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<NotificationEvent>>,
    seen: Mutex<HashSet<(&'static str, i64, Option<i64>, i64, &'static str)>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, event: NotificationEvent) -> Result<(), String> {
        if is_self_suppressed(&event) {
            return Ok(());
        }
        if event.dedupe && !self.seen.lock().unwrap().insert(dedupe_key(&event)) {
            return Ok(());
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

// endregion: --- Test Doubles

// region:    --- Fixtures

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn auction(id: i64, owner_id: i64, end_at: DateTime<Utc>) -> Auction {
    Auction {
        id,
        title: format!("테스트 경매 {}", id),
        description: "정산 테스트용 경매입니다.".to_string(),
        photos: vec![],
        category: "기타".to_string(),
        starting_price: 50_000,
        current_price: 50_000,
        status: AuctionStatus::Active.as_str().to_string(),
        owner_id,
        winner_id: None,
        created_at: end_at - Duration::hours(48),
        end_at,
    }
}

fn bid(id: i64, auction_id: i64, bidder_id: i64, amount: i64, at: DateTime<Utc>) -> Bid {
    Bid {
        id,
        auction_id,
        bidder_id,
        amount,
        created_at: at,
    }
}

// endregion: --- Fixtures

// region:    --- Tests

/// 입찰이 있는 만료 경매는 낙찰 처리되고 알림 두 건이 발행된다
#[tokio::test]
async fn test_settle_with_winner() {
    let end_at = t0() + Duration::hours(48);
    let store = InMemoryStore::new(
        vec![auction(1, 100, end_at)],
        vec![bid(1, 1, 200, 60_000, t0() + Duration::hours(1))],
    );
    let sink = RecordingSink::default();

    let settled = settle_expired(&store, &sink, end_at + Duration::hours(1), None).await;
    assert_eq!(settled, 1);

    let settled_auction = store.auction(1);
    assert_eq!(settled_auction.status, "ENDED");
    assert_eq!(settled_auction.winner_id, Some(200));

    let events = sink.events();
    assert_eq!(events.len(), 2);

    // 낙찰자에게: 낙찰 알림
    assert_eq!(events[0].kind, NotificationKind::AuctionWon);
    assert_eq!(events[0].recipient_id, 200);
    assert_eq!(events[0].sender_id, Some(100));
    assert_eq!(events[0].price, Some(60_000));
    assert!(!events[0].allow_self);

    // 판매자에게: 종료 알림
    assert_eq!(events[1].kind, NotificationKind::AuctionEnded);
    assert_eq!(events[1].recipient_id, 100);
    assert_eq!(events[1].sender_id, Some(200));
    assert_eq!(events[1].price, Some(60_000));
}

/// 입찰이 없는 만료 경매는 유찰 처리되고 본인 알림 한 건만 발행된다
#[tokio::test]
async fn test_settle_unsold() {
    let end_at = t0() + Duration::hours(48);
    let store = InMemoryStore::new(vec![auction(1, 100, end_at)], vec![]);
    let sink = RecordingSink::default();

    let settled = settle_expired(&store, &sink, end_at + Duration::hours(1), None).await;
    assert_eq!(settled, 1);

    let settled_auction = store.auction(1);
    assert_eq!(settled_auction.status, "UNSOLD");
    assert_eq!(settled_auction.winner_id, None);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, NotificationKind::AuctionUnsold);
    assert_eq!(events[0].recipient_id, 100);
    assert_eq!(events[0].sender_id, None);
    assert!(events[0].allow_self);
}

/// 같은 스윕을 연달아 실행해도 경매는 한 번만 전환되고 알림도 한 번만 발행된다
#[tokio::test]
async fn test_settle_idempotent() {
    let end_at = t0() + Duration::hours(48);
    let store = InMemoryStore::new(
        vec![auction(1, 100, end_at)],
        vec![bid(1, 1, 200, 60_000, t0() + Duration::hours(1))],
    );
    let sink = RecordingSink::default();
    let now = end_at + Duration::hours(1);

    let first = settle_expired(&store, &sink, now, None).await;
    let second = settle_expired(&store, &sink, now, None).await;

    assert_eq!(first, 1);
    assert_eq!(second, 0);
    assert_eq!(sink.events().len(), 2);
    assert_eq!(store.auction(1).status, "ENDED");
}

/// 동일 최고가는 먼저 입찰한 쪽이 낙찰된다
#[tokio::test]
async fn test_settle_tie_breaks_on_earliest_bid() {
    let end_at = t0() + Duration::hours(48);
    let store = InMemoryStore::new(
        vec![auction(1, 100, end_at)],
        vec![
            bid(1, 1, 201, 500_000, t0() + Duration::hours(2)),
            bid(2, 1, 202, 500_000, t0() + Duration::hours(1)),
            bid(3, 1, 203, 300_000, t0() + Duration::hours(3)),
        ],
    );
    let sink = RecordingSink::default();

    let settled = settle_expired(&store, &sink, end_at + Duration::hours(1), None).await;
    assert_eq!(settled, 1);
    assert_eq!(store.auction(1).winner_id, Some(202));

    let events = sink.events();
    assert_eq!(events[0].recipient_id, 202);
    assert_eq!(events[0].price, Some(500_000));
}

/// 특정 경매만 지정한 스윕은 다른 만료 경매를 건드리지 않는다
#[tokio::test]
async fn test_settle_scoped_to_target() {
    let end_at = t0() + Duration::hours(48);
    let store = InMemoryStore::new(
        vec![auction(1, 100, end_at), auction(2, 101, end_at)],
        vec![],
    );
    let sink = RecordingSink::default();

    let settled = settle_expired(&store, &sink, end_at + Duration::hours(1), Some(2)).await;
    assert_eq!(settled, 1);
    assert_eq!(store.auction(1).status, "ACTIVE");
    assert_eq!(store.auction(2).status, "UNSOLD");
}

/// 아직 만료되지 않은 경매는 정산 대상이 아니다
#[tokio::test]
async fn test_settle_skips_unexpired() {
    let end_at = t0() + Duration::hours(48);
    let store = InMemoryStore::new(vec![auction(1, 100, end_at)], vec![]);
    let sink = RecordingSink::default();

    let settled = settle_expired(&store, &sink, end_at - Duration::seconds(1), None).await;
    assert_eq!(settled, 0);
    assert_eq!(store.auction(1).status, "ACTIVE");
    assert!(sink.events().is_empty());
}

/// 한 경매의 저장소 오류는 나머지 경매의 정산을 막지 않는다
#[tokio::test]
async fn test_settle_isolates_per_auction_errors() {
    let end_at = t0() + Duration::hours(48);
    let mut store = InMemoryStore::new(
        vec![auction(1, 100, end_at), auction(2, 101, end_at)],
        vec![],
    );
    store.fail_transition_for = Some(1);
    let sink = RecordingSink::default();

    let settled = settle_expired(&store, &sink, end_at + Duration::hours(1), None).await;
    assert_eq!(settled, 1);
    assert_eq!(store.auction(1).status, "ACTIVE");
    assert_eq!(store.auction(2).status, "UNSOLD");
    assert_eq!(sink.events().len(), 1);
    assert_eq!(sink.events()[0].recipient_id, 101);
}

/// 싱크 수준에서도 같은 알림은 한 번만 기록된다
#[tokio::test]
async fn test_sink_dedupes_repeated_events() {
    let sink = RecordingSink::default();
    let event = NotificationEvent {
        kind: NotificationKind::AuctionWon,
        recipient_id: 200,
        sender_id: Some(100),
        target_id: 1,
        target_type: "auction",
        price: Some(60_000),
        dedupe: true,
        allow_self: false,
    };

    sink.notify(event.clone()).await.unwrap();
    sink.notify(event).await.unwrap();
    assert_eq!(sink.events().len(), 1);
}

/// 본인에게 보내는 알림은 allow_self 가 아니면 기록되지 않는다
#[tokio::test]
async fn test_sink_suppresses_self_notification() {
    let sink = RecordingSink::default();
    let mut event = NotificationEvent {
        kind: NotificationKind::AuctionUnsold,
        recipient_id: 100,
        sender_id: Some(100),
        target_id: 1,
        target_type: "auction",
        price: None,
        dedupe: true,
        allow_self: false,
    };

    sink.notify(event.clone()).await.unwrap();
    assert!(sink.events().is_empty());

    // 유찰 알림은 본인에게 허용된다
    event.allow_self = true;
    sink.notify(event).await.unwrap();
    assert_eq!(sink.events().len(), 1);
}

// endregion: --- Tests
