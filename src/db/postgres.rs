use std::future::Future;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tokio::time::timeout;
use tracing::instrument;

use super::models::change::MedalChange;
use super::models::player::Player;
use super::models::score::RankedScore;
use super::store::Store;
use super::{DbError, DbResult};
use crate::constants::{HISTORY_PAGE_SIZE, STORAGE_DEADLINE, TOP_TABLE_SIZE};
use crate::score::Platform;

const SCORE_FIELDS: &str = r#"
    score_id,
    player_id,
    scope,
    leaderboard_id,
    platform,
    score,
    max_score,
    submitted_at,
    modifiers,
    bad_cuts,
    missed_notes
"#;

const PLAYER_FIELDS: &str = r#"
    platform,
    player_id,
    region,
    name,
    medals,
    created_at,
    updated_at
"#;

const CHANGE_FIELDS: &str = r#"
    platform,
    player_id,
    scope,
    changed_at,
    medal_change,
    leaderboard_id,
    source_player_id,
    source_score_id
"#;

/// Every call runs under [`STORAGE_DEADLINE`]; an elapsed deadline fails the
/// call, not the worker that issued it.
async fn bounded<T>(fut: impl Future<Output = sqlx::Result<T>>) -> DbResult<T> {
    match timeout(STORAGE_DEADLINE, fut).await {
        Ok(res) => Ok(res?),
        Err(_) => Err(DbError::Deadline),
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: &'static PgPool,
}

impl PgStore {
    pub fn new(pool: &'static PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    #[instrument(skip(self))]
    async fn top_scores(
        &self,
        platform: Platform,
        leaderboard_id: &str,
        scope: &str,
    ) -> DbResult<Vec<RankedScore>> {
        bounded(
            sqlx::query_as::<Postgres, RankedScore>(&format!(
                r#"
                SELECT {SCORE_FIELDS} FROM scores
                WHERE platform = $1 AND leaderboard_id = $2 AND scope = $3
                ORDER BY score DESC, submitted_at ASC
                LIMIT $4
                "#
            ))
            .bind(platform)
            .bind(leaderboard_id)
            .bind(scope)
            .bind(TOP_TABLE_SIZE as i64)
            .fetch_all(self.pool),
        )
        .await
    }

    #[instrument(skip(self, row), fields(score_id = %row.score_id, scope = %row.scope))]
    async fn insert_score(&self, row: &RankedScore) -> DbResult<()> {
        bounded(
            sqlx::query(
                r#"
                INSERT INTO scores (
                    score_id,
                    player_id,
                    scope,
                    leaderboard_id,
                    platform,
                    score,
                    max_score,
                    submitted_at,
                    modifiers,
                    bad_cuts,
                    missed_notes
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(&row.score_id)
            .bind(&row.player_id)
            .bind(&row.scope)
            .bind(&row.leaderboard_id)
            .bind(row.platform)
            .bind(row.score)
            .bind(row.max_score)
            .bind(row.submitted_at)
            .bind(&row.modifiers)
            .bind(row.bad_cuts)
            .bind(row.missed_notes)
            .execute(self.pool),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_score(
        &self,
        platform: Platform,
        leaderboard_id: &str,
        scope: &str,
        score_id: &str,
    ) -> DbResult<()> {
        bounded(
            sqlx::query(
                r#"
                DELETE FROM scores
                WHERE platform = $1 AND leaderboard_id = $2 AND scope = $3 AND score_id = $4
                "#,
            )
            .bind(platform)
            .bind(leaderboard_id)
            .bind(scope)
            .bind(score_id)
            .execute(self.pool),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn score_by_id(
        &self,
        platform: Platform,
        score_id: &str,
    ) -> DbResult<Option<RankedScore>> {
        bounded(
            sqlx::query_as::<Postgres, RankedScore>(&format!(
                "SELECT {SCORE_FIELDS} FROM scores WHERE platform = $1 AND score_id = $2 LIMIT 1"
            ))
            .bind(platform)
            .bind(score_id)
            .fetch_optional(self.pool),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn player_scores(
        &self,
        platform: Platform,
        scope: &str,
        player_id: &str,
        page: i64,
        before: Option<i64>,
        after: Option<i64>,
    ) -> DbResult<Vec<RankedScore>> {
        bounded(
            sqlx::query_as::<Postgres, RankedScore>(&format!(
                r#"
                SELECT {SCORE_FIELDS} FROM scores
                WHERE platform = $1 AND scope = $2 AND player_id = $3
                AND ($4::BIGINT IS NULL OR submitted_at < $4)
                AND ($5::BIGINT IS NULL OR submitted_at > $5)
                ORDER BY submitted_at DESC
                LIMIT $6 OFFSET $7
                "#
            ))
            .bind(platform)
            .bind(scope)
            .bind(player_id)
            .bind(before)
            .bind(after)
            .bind(HISTORY_PAGE_SIZE)
            .bind(page * HISTORY_PAGE_SIZE)
            .fetch_all(self.pool),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn player(&self, platform: Platform, player_id: &str) -> DbResult<Option<Player>> {
        bounded(
            sqlx::query_as::<Postgres, Player>(&format!(
                "SELECT {PLAYER_FIELDS} FROM players WHERE platform = $1 AND player_id = $2"
            ))
            .bind(platform)
            .bind(player_id)
            .fetch_optional(self.pool),
        )
        .await
    }

    #[instrument(skip(self, player), fields(player_id = %player.player_id))]
    async fn insert_player(&self, player: &Player) -> DbResult<()> {
        bounded(
            sqlx::query(
                r#"
                INSERT INTO players (platform, player_id, region, name, medals, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (platform, player_id)
                DO NOTHING
                "#,
            )
            .bind(player.platform)
            .bind(&player.player_id)
            .bind(&player.region)
            .bind(&player.name)
            .bind(player.medals)
            .bind(player.created_at)
            .bind(player.updated_at)
            .execute(self.pool),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_medals(&self, platform: Platform, player_id: &str, delta: i64) -> DbResult<()> {
        bounded(
            sqlx::query(
                r#"
                UPDATE players
                SET medals = medals + $3,
                    updated_at = NOW()
                WHERE platform = $1 AND player_id = $2
                "#,
            )
            .bind(platform)
            .bind(player_id)
            .bind(delta)
            .execute(self.pool),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn top_medal_holders(
        &self,
        platform: Platform,
        region: &str,
        page: i64,
    ) -> DbResult<Vec<Player>> {
        let offset = page * HISTORY_PAGE_SIZE;

        if region == crate::constants::GLOBAL_SCOPE {
            return bounded(
                sqlx::query_as::<Postgres, Player>(&format!(
                    r#"
                    SELECT {PLAYER_FIELDS} FROM players
                    WHERE platform = $1
                    ORDER BY medals DESC, created_at ASC
                    LIMIT $2 OFFSET $3
                    "#
                ))
                .bind(platform)
                .bind(HISTORY_PAGE_SIZE)
                .bind(offset)
                .fetch_all(self.pool),
            )
            .await;
        }

        bounded(
            sqlx::query_as::<Postgres, Player>(&format!(
                r#"
                SELECT {PLAYER_FIELDS} FROM players
                WHERE platform = $1 AND region = $2
                ORDER BY medals DESC, created_at ASC
                LIMIT $3 OFFSET $4
                "#
            ))
            .bind(platform)
            .bind(region)
            .bind(HISTORY_PAGE_SIZE)
            .bind(offset)
            .fetch_all(self.pool),
        )
        .await
    }

    #[instrument(skip(self, change), fields(player_id = %change.player_id, delta = change.medal_change))]
    async fn insert_change(&self, change: &MedalChange) -> DbResult<()> {
        bounded(
            sqlx::query(
                r#"
                INSERT INTO changes (
                    platform,
                    player_id,
                    scope,
                    changed_at,
                    medal_change,
                    leaderboard_id,
                    source_player_id,
                    source_score_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(change.platform)
            .bind(&change.player_id)
            .bind(&change.scope)
            .bind(change.changed_at)
            .bind(change.medal_change)
            .bind(&change.leaderboard_id)
            .bind(&change.source_player_id)
            .bind(&change.source_score_id)
            .execute(self.pool),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn changes(
        &self,
        platform: Platform,
        player_id: &str,
        page: i64,
        before: Option<i64>,
        after: Option<i64>,
    ) -> DbResult<Vec<MedalChange>> {
        bounded(
            sqlx::query_as::<Postgres, MedalChange>(&format!(
                r#"
                SELECT {CHANGE_FIELDS} FROM changes
                WHERE platform = $1 AND player_id = $2
                AND ($3::BIGINT IS NULL OR changed_at < $3)
                AND ($4::BIGINT IS NULL OR changed_at > $4)
                ORDER BY changed_at DESC
                LIMIT $5 OFFSET $6
                "#
            ))
            .bind(platform)
            .bind(player_id)
            .bind(before)
            .bind(after)
            .bind(HISTORY_PAGE_SIZE)
            .bind(page * HISTORY_PAGE_SIZE)
            .fetch_all(self.pool),
        )
        .await
    }
}
