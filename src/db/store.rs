use async_trait::async_trait;

use super::DbResult;
use super::models::change::MedalChange;
use super::models::player::Player;
use super::models::score::RankedScore;
use crate::score::Platform;

/// The storage primitives the rest of the service is written against:
/// filtered fetches (single, and many with skip + limit), inserts, deletes
/// and updates over the three collections (`players`, `scores`, `changes`).
/// Nothing above this trait knows which engine sits underneath.
#[async_trait]
pub trait Store: Send + Sync {
    /// Current top-10 for one `(platform, leaderboard, scope)` key, ordered
    /// descending by raw score. Always a fresh read; never cached.
    async fn top_scores(
        &self,
        platform: Platform,
        leaderboard_id: &str,
        scope: &str,
    ) -> DbResult<Vec<RankedScore>>;

    async fn insert_score(&self, row: &RankedScore) -> DbResult<()>;

    async fn delete_score(
        &self,
        platform: Platform,
        leaderboard_id: &str,
        scope: &str,
        score_id: &str,
    ) -> DbResult<()>;

    async fn score_by_id(&self, platform: Platform, score_id: &str)
    -> DbResult<Option<RankedScore>>;

    /// One page of a player's placement rows in `scope`, newest first,
    /// optionally bounded to `(after, before)` in epoch milliseconds.
    async fn player_scores(
        &self,
        platform: Platform,
        scope: &str,
        player_id: &str,
        page: i64,
        before: Option<i64>,
        after: Option<i64>,
    ) -> DbResult<Vec<RankedScore>>;

    async fn player(&self, platform: Platform, player_id: &str) -> DbResult<Option<Player>>;

    async fn insert_player(&self, player: &Player) -> DbResult<()>;

    /// Adds `delta` to the player's medal total. A no-op if the player row
    /// does not exist.
    async fn add_medals(&self, platform: Platform, player_id: &str, delta: i64) -> DbResult<()>;

    /// One page of the medal leaderboard for a region, ordered by medal
    /// total. The `"Global"` scope ranks every region together.
    async fn top_medal_holders(
        &self,
        platform: Platform,
        region: &str,
        page: i64,
    ) -> DbResult<Vec<Player>>;

    async fn insert_change(&self, change: &MedalChange) -> DbResult<()>;

    /// One page of a player's medal history, newest first, optionally
    /// bounded to `(after, before)` in epoch milliseconds.
    async fn changes(
        &self,
        platform: Platform,
        player_id: &str,
        page: i64,
        before: Option<i64>,
        after: Option<i64>,
    ) -> DbResult<Vec<MedalChange>>;
}
