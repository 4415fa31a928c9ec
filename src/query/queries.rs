/// 경매 조회
pub const GET_AUCTION: &str = r#"
    SELECT id, title, description, photos, category, starting_price, current_price,
           status, owner_id, winner_id, created_at, end_at
    FROM auctions
    WHERE id = $1
"#;

/// 모든 경매 조회
pub const GET_ALL_AUCTIONS: &str = r#"
    SELECT id, title, description, photos, category, starting_price, current_price,
           status, owner_id, winner_id, created_at, end_at
    FROM auctions
    ORDER BY created_at DESC
"#;

/// 입찰 이력 조회
pub const GET_AUCTION_BIDS: &str = r#"
    SELECT id, auction_id, bidder_id, amount, created_at
    FROM bids
    WHERE auction_id = $1
    ORDER BY created_at DESC
"#;

/// 최고 입찰 조회 (동일 금액은 먼저 입찰한 순)
pub const GET_TOP_BID: &str = r#"
    SELECT id, auction_id, bidder_id, amount, created_at
    FROM bids
    WHERE auction_id = $1
    ORDER BY amount DESC, created_at ASC
    LIMIT 1
"#;

/// 종료 시각이 지난 진행중 경매 조회
pub const GET_ACTIVE_EXPIRED: &str = r#"
    SELECT id, title, description, photos, category, starting_price, current_price,
           status, owner_id, winner_id, created_at, end_at
    FROM auctions
    WHERE status = 'ACTIVE' AND end_at <= $1
"#;

/// 종료 시각이 지난 진행중 경매 조회 (특정 경매 한정)
pub const GET_ACTIVE_EXPIRED_ONE: &str = r#"
    SELECT id, title, description, photos, category, starting_price, current_price,
           status, owner_id, winner_id, created_at, end_at
    FROM auctions
    WHERE status = 'ACTIVE' AND end_at <= $1 AND id = $2
"#;

/// 진행중일 때만 상태 전환 (조건부 갱신)
pub const TRANSITION_IF_ACTIVE: &str =
    "UPDATE auctions SET status = $1, winner_id = $2 WHERE id = $3 AND status = 'ACTIVE'";

/// 사용자의 진행중 경매 수 조회
pub const COUNT_ACTIVE_BY_OWNER: &str =
    "SELECT COUNT(*) FROM auctions WHERE owner_id = $1 AND status = 'ACTIVE'";

/// 경매 입찰 수 조회
pub const COUNT_BIDS: &str = "SELECT COUNT(*) FROM bids WHERE auction_id = $1";

/// 경매 등록
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (title, description, photos, category, starting_price,
                          current_price, status, owner_id, created_at, end_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING id, title, description, photos, category, starting_price, current_price,
              status, owner_id, winner_id, created_at, end_at
"#;

/// 현재 가격 조건부 갱신 (낙관적 동시성: 읽었던 가격 그대로일 때만 반영)
pub const CAS_UPDATE_PRICE: &str = r#"
    UPDATE auctions SET current_price = $1
    WHERE id = $2 AND status = 'ACTIVE' AND current_price = $3
"#;

/// 입찰 기록
pub const INSERT_BID: &str =
    "INSERT INTO bids (auction_id, bidder_id, amount, created_at) VALUES ($1, $2, $3, $4)";

/// 경매 수정 (입찰이 없는 진행중 경매만, 현재 가격은 시작가를 따른다)
/// 입찰 없음 조건을 갱신 쿼리 자체에 포함해 입찰 수 확인과 갱신 사이에
/// 들어온 입찰이 덮어써지지 않게 한다
pub const UPDATE_AUCTION: &str = r#"
    UPDATE auctions
    SET title = $1, description = $2, photos = $3, category = $4,
        starting_price = $5, current_price = $6, end_at = $7
    WHERE id = $8 AND status = 'ACTIVE'
      AND NOT EXISTS (SELECT 1 FROM bids WHERE auction_id = $8)
"#;

/// 경매 취소 (조건부 갱신)
pub const CANCEL_AUCTION: &str =
    "UPDATE auctions SET status = 'CANCELLED' WHERE id = $1 AND status = 'ACTIVE'";

/// 알림 중복 확인 (종류 + 수신자 + 발신자 + 대상)
pub const NOTIFICATION_EXISTS: &str = r#"
    SELECT EXISTS(
        SELECT 1 FROM notifications
        WHERE kind = $1 AND recipient_id = $2
          AND sender_id IS NOT DISTINCT FROM $3
          AND target_id = $4 AND target_type = $5
    )
"#;

/// 알림 기록
pub const INSERT_NOTIFICATION: &str = r#"
    INSERT INTO notifications (kind, recipient_id, sender_id, target_id, target_type, price, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

// region:    --- Tests


// endregion: --- Tests
