//! In-memory [`Store`] used by the handler and api tests. Behaves like the
//! Postgres backend for the operations the service issues, including the
//! tie-break ordering, so reconciliation tests exercise the real code path
//! without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::DbResult;
use super::models::change::MedalChange;
use super::models::player::Player;
use super::models::score::RankedScore;
use super::store::Store;
use crate::constants::{HISTORY_PAGE_SIZE, TOP_TABLE_SIZE};
use crate::score::Platform;

#[derive(Debug, Default)]
struct Inner {
    players: HashMap<(Platform, String), Player>,
    scores: Vec<RankedScore>,
    changes: Vec<MedalChange>,
}

#[derive(Debug, Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn score_rows(&self) -> usize {
        self.inner.lock().await.scores.len()
    }

    pub async fn change_rows(&self) -> usize {
        self.inner.lock().await.changes.len()
    }

    pub async fn medal_total(&self, platform: Platform, player_id: &str) -> i64 {
        self.inner
            .lock()
            .await
            .players
            .get(&(platform, player_id.to_string()))
            .map(|p| p.medals)
            .unwrap_or_default()
    }
}

fn page_slice<T: Clone>(items: &[T], page: i64) -> Vec<T> {
    let start = (page * HISTORY_PAGE_SIZE).max(0) as usize;
    items
        .iter()
        .skip(start)
        .take(HISTORY_PAGE_SIZE as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl Store for MemStore {
    async fn top_scores(
        &self,
        platform: Platform,
        leaderboard_id: &str,
        scope: &str,
    ) -> DbResult<Vec<RankedScore>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<RankedScore> = inner
            .scores
            .iter()
            .filter(|s| {
                s.platform == platform && s.leaderboard_id == leaderboard_id && s.scope == scope
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        });
        rows.truncate(TOP_TABLE_SIZE);

        Ok(rows)
    }

    async fn insert_score(&self, row: &RankedScore) -> DbResult<()> {
        self.inner.lock().await.scores.push(row.clone());
        Ok(())
    }

    async fn delete_score(
        &self,
        platform: Platform,
        leaderboard_id: &str,
        scope: &str,
        score_id: &str,
    ) -> DbResult<()> {
        self.inner.lock().await.scores.retain(|s| {
            !(s.platform == platform
                && s.leaderboard_id == leaderboard_id
                && s.scope == scope
                && s.score_id == score_id)
        });
        Ok(())
    }

    async fn score_by_id(
        &self,
        platform: Platform,
        score_id: &str,
    ) -> DbResult<Option<RankedScore>> {
        Ok(self
            .inner
            .lock()
            .await
            .scores
            .iter()
            .find(|s| s.platform == platform && s.score_id == score_id)
            .cloned())
    }

    async fn player_scores(
        &self,
        platform: Platform,
        scope: &str,
        player_id: &str,
        page: i64,
        before: Option<i64>,
        after: Option<i64>,
    ) -> DbResult<Vec<RankedScore>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<RankedScore> = inner
            .scores
            .iter()
            .filter(|s| {
                s.platform == platform
                    && s.scope == scope
                    && s.player_id.0 == player_id
                    && before.is_none_or(|b| s.submitted_at < b)
                    && after.is_none_or(|a| s.submitted_at > a)
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        Ok(page_slice(&rows, page))
    }

    async fn player(&self, platform: Platform, player_id: &str) -> DbResult<Option<Player>> {
        Ok(self
            .inner
            .lock()
            .await
            .players
            .get(&(platform, player_id.to_string()))
            .cloned())
    }

    async fn insert_player(&self, player: &Player) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .players
            .entry((player.platform, player.player_id.0.clone()))
            .or_insert_with(|| player.clone());
        Ok(())
    }

    async fn add_medals(&self, platform: Platform, player_id: &str, delta: i64) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(player) = inner.players.get_mut(&(platform, player_id.to_string())) {
            player.medals += delta;
        }
        Ok(())
    }

    async fn top_medal_holders(
        &self,
        platform: Platform,
        region: &str,
        page: i64,
    ) -> DbResult<Vec<Player>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Player> = inner
            .players
            .values()
            .filter(|p| {
                p.platform == platform
                    && (region == crate::constants::GLOBAL_SCOPE || p.region == region)
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.medals
                .cmp(&a.medals)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        Ok(page_slice(&rows, page))
    }

    async fn insert_change(&self, change: &MedalChange) -> DbResult<()> {
        self.inner.lock().await.changes.push(change.clone());
        Ok(())
    }

    async fn changes(
        &self,
        platform: Platform,
        player_id: &str,
        page: i64,
        before: Option<i64>,
        after: Option<i64>,
    ) -> DbResult<Vec<MedalChange>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<MedalChange> = inner
            .changes
            .iter()
            .filter(|c| {
                c.platform == platform
                    && c.player_id.0 == player_id
                    && before.is_none_or(|b| c.changed_at < b)
                    && after.is_none_or(|a| c.changed_at > a)
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));

        Ok(page_slice(&rows, page))
    }
}
