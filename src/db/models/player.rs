use core::fmt;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::score::Platform;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct PlayerId(pub String);

/// Base player table model. Keyed by `(platform, player_id)`; created lazily
/// the first time a qualifying score touches the player, never deleted.
/// `medals` is the running sum of every delta the ledger has applied.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Player {
    pub platform: Platform,
    pub player_id: PlayerId,
    pub region: String,
    pub name: String,
    pub medals: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Player {
    pub fn new(platform: Platform, player_id: &str, region: &str, name: &str) -> Self {
        Self {
            platform,
            player_id: player_id.into(),
            region: region.to_string(),
            name: name.to_string(),
            medals: 0,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        PlayerId(value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        PlayerId(value.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
