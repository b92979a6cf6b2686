use serde::Serialize;

use super::player::PlayerId;
use crate::score::{Platform, ScoreEvent};

/// One placement row in one scope's top-10 for one leaderboard.
///
/// For any `(platform, leaderboard_id, scope)` there are at most ten of
/// these, one per player, and ranking order is derived from `score` at read
/// time; it is never stored. Rows are created and deleted exclusively by the
/// score handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RankedScore {
    pub score_id: String,
    pub player_id: PlayerId,
    pub scope: String,
    pub leaderboard_id: String,
    pub platform: Platform,
    pub score: i64,
    pub max_score: i64,
    /// Submission time, epoch milliseconds.
    pub submitted_at: i64,
    pub modifiers: String,
    pub bad_cuts: i32,
    pub missed_notes: i32,
}

impl RankedScore {
    pub fn from_event(event: &ScoreEvent, scope: &str) -> Self {
        Self {
            score_id: event.score_id.clone(),
            player_id: event.player_id.as_str().into(),
            scope: scope.to_string(),
            leaderboard_id: event.leaderboard_id.clone(),
            platform: event.platform,
            score: event.score,
            max_score: event.max_score,
            submitted_at: event.timestamp,
            modifiers: event.modifiers.clone(),
            bad_cuts: event.bad_cuts,
            missed_notes: event.missed_notes,
        }
    }
}
