/// 알림 이벤트 모델과 발행 인터페이스
/// 실제 푸시/전달 파이프라인은 별도 서비스가 담당한다고 가정하고,
/// 여기서는 알림 기록 저장과 Kafka 발행까지만 책임진다.
// region:    --- Imports
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::message_broker::KafkaProducer;
use crate::query::queries;
// endregion: --- Imports

// region:    --- Notification Model

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// 낙찰자에게: 낙찰되었습니다
    AuctionWon,
    /// 판매자에게: 경매가 낙찰로 종료되었습니다
    AuctionEnded,
    /// 판매자에게: 경매가 유찰되었습니다
    AuctionUnsold,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AuctionWon => "AUCTION_WON",
            NotificationKind::AuctionEnded => "AUCTION_ENDED",
            NotificationKind::AuctionUnsold => "AUCTION_UNSOLD",
        }
    }
}

/// 알림 이벤트
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub recipient_id: i64,
    pub sender_id: Option<i64>,
    pub target_id: i64,
    pub target_type: &'static str,
    pub price: Option<i64>,
    /// 동일한 (종류, 수신자, 발신자, 대상) 알림의 중복 발행을 막는다
    pub dedupe: bool,
    /// 본인에게 보내는 알림 허용 여부 (유찰 알림만 허용)
    pub allow_self: bool,
}

/// 본인에게 보내는 알림 차단 여부 (유찰 알림처럼 allow_self 인 경우만 허용)
pub fn is_self_suppressed(event: &NotificationEvent) -> bool {
    !event.allow_self && event.sender_id == Some(event.recipient_id)
}

/// 중복 확인 키: 종류 + 수신자 + 발신자 + 대상
/// 이 키가 같은 알림은 논리적으로 같은 사건이므로 한 번만 발행한다
pub fn dedupe_key(
    event: &NotificationEvent,
) -> (&'static str, i64, Option<i64>, i64, &'static str) {
    (
        event.kind.as_str(),
        event.recipient_id,
        event.sender_id,
        event.target_id,
        event.target_type,
    )
}

// endregion: --- Notification Model

// region:    --- Notification Sink

/// 알림 발행 인터페이스
#[async_trait]
pub trait NotificationSink {
    async fn notify(&self, event: NotificationEvent) -> Result<(), String>;
}

/// 알림 저장 + Kafka 발행 구현체
/// 중복 확인 키를 알림 레코드 자체에 저장하므로 프로세스 재시작이나
/// 다중 인스턴스 환경에서도 중복 발행이 일어나지 않는다.
pub struct PostgresNotificationSink {
    pool: Arc<PgPool>,
    producer: Arc<KafkaProducer>,
}

impl PostgresNotificationSink {
    pub fn new(pool: Arc<PgPool>, producer: Arc<KafkaProducer>) -> Self {
        Self { pool, producer }
    }
}

#[async_trait]
impl NotificationSink for PostgresNotificationSink {
    async fn notify(&self, event: NotificationEvent) -> Result<(), String> {
        // 본인에게 보내는 알림은 기본적으로 차단
        if is_self_suppressed(&event) {
            return Ok(());
        }

        // 중복 발행 확인: 같은 알림이 이미 저장되어 있으면 조용히 건너뛴다
        if event.dedupe {
            let exists = sqlx::query_scalar::<_, bool>(queries::NOTIFICATION_EXISTS)
                .bind(event.kind.as_str())
                .bind(event.recipient_id)
                .bind(event.sender_id)
                .bind(event.target_id)
                .bind(event.target_type)
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| e.to_string())?;
            if exists {
                return Ok(());
            }
        }

        sqlx::query(queries::INSERT_NOTIFICATION)
            .bind(event.kind.as_str())
            .bind(event.recipient_id)
            .bind(event.sender_id)
            .bind(event.target_id)
            .bind(event.target_type)
            .bind(event.price)
            .bind(Utc::now())
            .execute(&*self.pool)
            .await
            .map_err(|e| e.to_string())?;

        // 다운스트림 전달 파이프라인을 위해 Kafka 에도 발행
        self.producer
            .send_message(
                "notifications",
                &event.target_id.to_string(),
                &serde_json::to_string(&event).map_err(|e| e.to_string())?,
            )
            .await?;

        info!(
            "{:<12} --> 알림 발행: {} -> 사용자 {}",
            "Notify",
            event.kind.as_str(),
            event.recipient_id
        );
        Ok(())
    }
}

// endregion: --- Notification Sink

// region:    --- Tests


// endregion: --- Tests
