use serde::Serialize;

use super::player::PlayerId;
use crate::score::{Platform, ScoreEvent};

/// Audit row: one medal delta applied to one player, with the score that
/// caused it. Append-only; the read api serves these as the player's medal
/// history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MedalChange {
    pub platform: Platform,
    pub player_id: PlayerId,
    pub scope: String,
    /// Submission time of the responsible score, epoch milliseconds.
    pub changed_at: i64,
    pub medal_change: i64,
    pub leaderboard_id: String,
    pub source_player_id: String,
    pub source_score_id: String,
}

impl MedalChange {
    pub fn from_event(event: &ScoreEvent, scope: &str, player_id: &str, delta: i64) -> Self {
        Self {
            platform: event.platform,
            player_id: player_id.into(),
            scope: scope.to_string(),
            changed_at: event.timestamp,
            medal_change: delta,
            leaderboard_id: event.leaderboard_id.clone(),
            source_player_id: event.player_id.clone(),
            source_score_id: event.score_id.clone(),
        }
    }
}
