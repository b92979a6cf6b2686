use sqlx::PgPool;
use tracing::instrument;

use super::DbResult;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    platform    SMALLINT NOT NULL,
    player_id   TEXT NOT NULL,
    region      TEXT NOT NULL,
    name        TEXT NOT NULL,
    medals      BIGINT NOT NULL DEFAULT 0,
    created_at  TIMESTAMP NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMP NOT NULL DEFAULT NOW(),
    PRIMARY KEY (platform, player_id)
);

CREATE TABLE IF NOT EXISTS scores (
    score_id        TEXT NOT NULL,
    player_id       TEXT NOT NULL,
    scope           TEXT NOT NULL,
    leaderboard_id  TEXT NOT NULL,
    platform        SMALLINT NOT NULL,
    score           BIGINT NOT NULL,
    max_score       BIGINT NOT NULL,
    submitted_at    BIGINT NOT NULL,
    modifiers       TEXT NOT NULL DEFAULT '',
    bad_cuts        INT NOT NULL DEFAULT 0,
    missed_notes    INT NOT NULL DEFAULT 0,
    PRIMARY KEY (platform, scope, leaderboard_id, player_id)
);

CREATE INDEX IF NOT EXISTS scores_table_idx
    ON scores (platform, leaderboard_id, scope, score DESC);

CREATE INDEX IF NOT EXISTS scores_player_idx
    ON scores (platform, scope, player_id, submitted_at DESC);

CREATE TABLE IF NOT EXISTS changes (
    id                BIGSERIAL PRIMARY KEY,
    platform          SMALLINT NOT NULL,
    player_id         TEXT NOT NULL,
    scope             TEXT NOT NULL,
    changed_at        BIGINT NOT NULL,
    medal_change      BIGINT NOT NULL,
    leaderboard_id    TEXT NOT NULL,
    source_player_id  TEXT NOT NULL,
    source_score_id   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS changes_player_idx
    ON changes (platform, player_id, changed_at DESC);

CREATE INDEX IF NOT EXISTS players_region_idx
    ON players (platform, region, medals DESC);
"#;

/// Idempotent bootstrap, run once at startup.
#[instrument(skip(pool))]
pub async fn migrate(pool: &PgPool) -> DbResult<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("schema bootstrap complete");

    Ok(())
}
