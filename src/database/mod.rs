// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::auction::model::{Auction, AuctionStatus, Bid};
use crate::auction::settlement::AuctionStore;
use crate::query::queries;
// endregion: --- Imports

// region:    --- Database Manager

pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
}

impl DatabaseManager {
    /// 데이터베이스 매니저 생성
    pub async fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to create pool");
        Self {
            pool: Arc::new(pool),
        }
    }

    /// 데이터베이스 풀 가져오기
    pub fn get_pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    /// 트랜잭션 실행
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// 데이터베이스 초기화
    pub async fn initialize_database(&self) -> Result<(), sqlx::Error> {
        // 00-recreate-db.sql 실행
        let recreate_db_sql = include_str!("../sql/00-recreate-db.sql");
        self.execute_multi_query(recreate_db_sql).await?;

        // 01-create-schema.sql 실행
        let create_schema_sql = include_str!("../sql/01-create-schema.sql");
        self.execute_multi_query(create_schema_sql).await?;

        Ok(())
    }

    /// 여러 쿼리 실행
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// endregion: --- Database Manager

// region:    --- Postgres Auction Store

/// 정산 저장소의 Postgres 구현체
pub struct PostgresAuctionStore {
    pool: Arc<PgPool>,
}

impl PostgresAuctionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuctionStore for PostgresAuctionStore {
    async fn find_active_expired(
        &self,
        now: DateTime<Utc>,
        auction_id: Option<i64>,
    ) -> Result<Vec<Auction>, String> {
        let result = match auction_id {
            Some(id) => {
                sqlx::query_as::<_, Auction>(queries::GET_ACTIVE_EXPIRED_ONE)
                    .bind(now)
                    .bind(id)
                    .fetch_all(&*self.pool)
                    .await
            }
            None => {
                sqlx::query_as::<_, Auction>(queries::GET_ACTIVE_EXPIRED)
                    .bind(now)
                    .fetch_all(&*self.pool)
                    .await
            }
        };
        result.map_err(|e| e.to_string())
    }

    async fn find_top_bid(&self, auction_id: i64) -> Result<Option<Bid>, String> {
        sqlx::query_as::<_, Bid>(queries::GET_TOP_BID)
            .bind(auction_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| e.to_string())
    }

    async fn transition_if_active(
        &self,
        auction_id: i64,
        status: AuctionStatus,
        winner_id: Option<i64>,
    ) -> Result<u64, String> {
        sqlx::query(queries::TRANSITION_IF_ACTIVE)
            .bind(status.as_str())
            .bind(winner_id)
            .bind(auction_id)
            .execute(&*self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| e.to_string())
    }
}

// endregion: --- Postgres Auction Store
