//! Wire shapes for the BeatLeader score feed.
//!
//! BeatLeader pushes the score object flat, with the player and leaderboard
//! documents embedded. Same tolerance rule as the ScoreSaber shapes: unknown
//! fields are ignored, missing ones default.

// the feed sends far more than the tracker reads
#![allow(dead_code)]

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlScore {
    pub id: i64,
    pub base_score: i64,
    pub modified_score: i64,
    pub accuracy: f64,
    pub player_id: String,
    pub pp: f64,
    pub bonus_pp: f64,
    pub rank: i32,
    pub country: String,
    pub fc_accuracy: f64,
    pub weight: f64,
    pub replay: String,
    pub modifiers: String,
    pub bad_cuts: i32,
    pub missed_notes: i32,
    pub bomb_cuts: i32,
    pub walls_hit: i32,
    pub pauses: i32,
    pub full_combo: bool,
    pub max_combo: i32,
    pub leaderboard_id: String,
    pub timeset: String,
    /// Epoch seconds.
    pub timepost: i64,
    pub player: BlPlayer,
    pub leaderboard: BlLeaderboard,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlPlayer {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub avatar: String,
    pub country: String,
    pub pp: f64,
    pub rank: i32,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlLeaderboard {
    pub id: String,
    pub song: BlSong,
    pub difficulty: BlDifficulty,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlSong {
    pub id: String,
    pub hash: String,
    pub name: String,
    pub sub_name: String,
    pub author: String,
    pub mapper: String,
    pub bpm: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlDifficulty {
    pub id: i64,
    pub value: i32,
    pub mode: i32,
    pub difficulty_name: String,
    pub mode_name: String,
    pub status: i32,
    pub stars: f64,
    pub njs: f64,
    pub nps: f64,
    pub notes: i32,
    pub max_score: i64,
}
