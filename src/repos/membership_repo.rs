/*
 * Responsibility
 * - users / household_members の読み取り専用クエリ
 * - claim store が使う membership 情報を返す
 * - 書き込みはしない (household CRUD は別の責務)
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoResult;

/// One row per household the user belongs to. A user without any household
/// yields a single row with empty household columns.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRow {
    #[sqlx(rename = "userId")]
    pub user_id: Uuid,
    pub email: Option<String>,
    #[sqlx(rename = "displayName")]
    pub display_name: Option<String>,
    #[sqlx(rename = "householdId")]
    pub household_id: Option<Uuid>,
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MembershipRepo {
    pool: PgPool,
}

impl MembershipRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // `user_key` is either the user id (uuid text) or the user name.
    pub async fn list_for_user(&self, user_key: &str) -> RepoResult<Vec<MembershipRow>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                u."userId", u.email, u."displayName",
                m."householdId", m.role
            FROM users u
            LEFT JOIN household_members m ON m."userId" = u."userId"
            WHERE u."userId"::text = $1 OR u."userName" = $1
            ORDER BY m."joinedAt" ASC NULLS LAST
            "#,
        )
        .bind(user_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
