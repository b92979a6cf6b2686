//! Wire shapes for the ScoreSaber websocket feed.
//!
//! Every message is a `{ commandName, commandData }` envelope; only score
//! uploads carry a populated command payload. Fields the tracker never reads
//! fall back to their defaults so a sparse frame still deserializes and gets
//! filtered out by the ranked predicate instead of erroring.

// the feed sends far more than the tracker reads
#![allow(dead_code)]

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsEnvelope {
    pub command_name: String,
    pub command_data: SsCommandData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsCommandData {
    pub score: SsScore,
    pub leaderboard: SsLeaderboard,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsScore {
    pub id: i64,
    pub leaderboard_player_info: SsPlayerInfo,
    pub rank: i32,
    pub base_score: f64,
    pub modified_score: i64,
    pub pp: f64,
    pub weight: f64,
    pub modifiers: String,
    pub multiplier: f64,
    pub bad_cuts: i32,
    pub missed_notes: i32,
    pub max_combo: i32,
    pub full_combo: bool,
    pub hmd: i32,
    /// Epoch milliseconds, as a string.
    pub time_set: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsPlayerInfo {
    pub id: String,
    pub name: String,
    pub profile_picture: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsLeaderboard {
    pub id: i64,
    pub song_hash: String,
    pub song_name: String,
    pub song_sub_name: String,
    pub song_author_name: String,
    pub level_author_name: String,
    pub difficulty: SsDifficulty,
    pub max_score: f64,
    pub ranked: bool,
    pub qualified: bool,
    pub stars: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SsDifficulty {
    pub leaderboard_id: i64,
    pub difficulty: i32,
    pub game_mode: String,
    pub difficulty_raw: String,
}
