/// 만료 경매 정산 스케줄러
/// 종료 시각이 지난 진행중 경매를 주기적으로 정산한다.
/// 경매 상세 조회 시의 즉시 정산과 동시에 실행되어도 조건부 상태 전환
/// 덕분에 같은 경매가 두 번 처리되지 않는다.
// region:    --- Imports
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::auction::settlement::settle_expired;
use crate::database::PostgresAuctionStore;
use crate::message_broker::KafkaProducer;
use crate::notification::PostgresNotificationSink;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Auction Scheduler

/// 만료 경매 정산 스케줄러
pub struct AuctionScheduler {
    pool: Arc<PgPool>,
    producer: Arc<KafkaProducer>,
}

/// 만료 경매 정산 스케줄러 생성
impl AuctionScheduler {
    pub fn new(pool: Arc<PgPool>, producer: Arc<KafkaProducer>) -> Self {
        Self { pool, producer }
    }

    /// 만료 경매 정산 스케줄러 시작
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        let producer = Arc::clone(&self.producer);
        tokio::spawn(async move {
            let store = PostgresAuctionStore::new(Arc::clone(&pool));
            let sink = PostgresNotificationSink::new(pool, producer);
            let mut interval = interval(Duration::from_secs(10)); // 10초마다 실행
            loop {
                interval.tick().await;
                let settled = settle_expired(&store, &sink, Utc::now(), None).await;
                if settled > 0 {
                    info!("{:<12} --> 만료 경매 {}건 정산 완료", "Scheduler", settled);
                } else {
                    debug!("{:<12} --> 정산 대상 경매 없음", "Scheduler");
                }
            }
        });
    }
}

// endregion: --- Auction Scheduler
