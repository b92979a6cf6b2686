use core::fmt;

use serde::{Serialize, Serializer};

use crate::score::beatleader::BlScore;
use crate::score::scoresaber::SsEnvelope;

/// The two inbound platforms. Stored and served as their numeric ids
/// (1 = ScoreSaber, 2 = BeatLeader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[repr(i16)]
pub enum Platform {
    ScoreSaber = 1,
    BeatLeader = 2,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::ScoreSaber => "scoresaber",
            Platform::BeatLeader => "beatleader",
        }
    }
}

impl TryFrom<i16> for Platform {
    type Error = i16;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Platform::ScoreSaber),
            2 => Ok(Platform::BeatLeader),
            other => Err(other),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(*self as i16)
    }
}

/// A raw feed message, tagged with the platform it arrived on. The accessors
/// below are the shared contract both wire shapes are read through; nothing
/// downstream of this enum knows which platform a score came from beyond the
/// tag itself.
#[derive(Debug, Clone)]
pub enum PlatformMessage {
    ScoreSaber(SsEnvelope),
    BeatLeader(BlScore),
}

impl PlatformMessage {
    pub fn parse(platform: Platform, raw: &[u8]) -> serde_json::Result<Self> {
        Ok(match platform {
            Platform::ScoreSaber => Self::ScoreSaber(serde_json::from_slice(raw)?),
            Platform::BeatLeader => Self::BeatLeader(serde_json::from_slice(raw)?),
        })
    }

    pub fn platform(&self) -> Platform {
        match self {
            Self::ScoreSaber(_) => Platform::ScoreSaber,
            Self::BeatLeader(_) => Platform::BeatLeader,
        }
    }

    pub fn score_id(&self) -> String {
        match self {
            Self::ScoreSaber(m) => m.command_data.score.id.to_string(),
            Self::BeatLeader(m) => m.id.to_string(),
        }
    }

    pub fn player_id(&self) -> &str {
        match self {
            Self::ScoreSaber(m) => &m.command_data.score.leaderboard_player_info.id,
            Self::BeatLeader(m) => &m.player.id,
        }
    }

    pub fn player_name(&self) -> &str {
        match self {
            Self::ScoreSaber(m) => &m.command_data.score.leaderboard_player_info.name,
            Self::BeatLeader(m) => &m.player.name,
        }
    }

    pub fn leaderboard_id(&self) -> String {
        match self {
            Self::ScoreSaber(m) => m.command_data.leaderboard.id.to_string(),
            Self::BeatLeader(m) => m.leaderboard_id.clone(),
        }
    }

    pub fn leaderboard_name(&self) -> &str {
        match self {
            Self::ScoreSaber(m) => &m.command_data.leaderboard.song_name,
            Self::BeatLeader(m) => &m.leaderboard.song.name,
        }
    }

    pub fn difficulty(&self) -> &str {
        match self {
            Self::ScoreSaber(m) => &m.command_data.leaderboard.difficulty.difficulty_raw,
            Self::BeatLeader(m) => &m.leaderboard.difficulty.difficulty_name,
        }
    }

    pub fn region(&self) -> &str {
        match self {
            Self::ScoreSaber(m) => &m.command_data.score.leaderboard_player_info.country,
            Self::BeatLeader(m) => &m.player.country,
        }
    }

    pub fn score(&self) -> i64 {
        match self {
            Self::ScoreSaber(m) => m.command_data.score.modified_score,
            Self::BeatLeader(m) => m.modified_score,
        }
    }

    pub fn max_score(&self) -> i64 {
        match self {
            Self::ScoreSaber(m) => m.command_data.leaderboard.max_score as i64,
            Self::BeatLeader(m) => m.leaderboard.difficulty.max_score,
        }
    }

    /// Submission time in epoch milliseconds. ScoreSaber sends epoch-ms as a
    /// string, BeatLeader sends epoch seconds.
    pub fn timestamp_ms(&self) -> i64 {
        match self {
            Self::ScoreSaber(m) => {
                let raw = &m.command_data.score.time_set;
                raw.parse().unwrap_or_else(|_| {
                    tracing::warn!(time_set = %raw, "unparseable scoresaber timestamp");
                    0
                })
            }
            Self::BeatLeader(m) => m.timepost * 1000,
        }
    }

    pub fn modifiers(&self) -> &str {
        match self {
            Self::ScoreSaber(m) => &m.command_data.score.modifiers,
            Self::BeatLeader(m) => &m.modifiers,
        }
    }

    pub fn bad_cuts(&self) -> i32 {
        match self {
            Self::ScoreSaber(m) => m.command_data.score.bad_cuts,
            Self::BeatLeader(m) => m.bad_cuts,
        }
    }

    pub fn missed_notes(&self) -> i32 {
        match self {
            Self::ScoreSaber(m) => m.command_data.score.missed_notes,
            Self::BeatLeader(m) => m.missed_notes,
        }
    }

    /// Both platforms only award pp on ranked leaderboards.
    pub fn ranked(&self) -> bool {
        match self {
            Self::ScoreSaber(m) => m.command_data.score.pp > 0.0,
            Self::BeatLeader(m) => m.pp > 0.0,
        }
    }

    pub fn into_event(self) -> ScoreEvent {
        ScoreEvent {
            platform: self.platform(),
            score_id: self.score_id(),
            player_id: self.player_id().to_string(),
            player_name: self.player_name().to_string(),
            leaderboard_id: self.leaderboard_id(),
            leaderboard_name: self.leaderboard_name().to_string(),
            difficulty: self.difficulty().to_string(),
            region: self.region().to_string(),
            score: self.score(),
            max_score: self.max_score(),
            timestamp: self.timestamp_ms(),
            modifiers: self.modifiers().to_string(),
            bad_cuts: self.bad_cuts(),
            missed_notes: self.missed_notes(),
            ranked: self.ranked(),
        }
    }
}

/// The canonical score event. Built once per accepted message, handed to the
/// dispatcher, then discarded.
#[derive(Debug, Clone)]
pub struct ScoreEvent {
    pub platform: Platform,
    pub score_id: String,
    pub player_id: String,
    pub player_name: String,
    pub leaderboard_id: String,
    pub leaderboard_name: String,
    pub difficulty: String,
    pub region: String,
    pub score: i64,
    pub max_score: i64,
    pub timestamp: i64,
    pub modifiers: String,
    pub bad_cuts: i32,
    pub missed_notes: i32,
    pub ranked: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    const SCORESABER_UPLOAD: &str = r#"{
        "commandName": "score",
        "commandData": {
            "score": {
                "id": 91834502,
                "leaderboardPlayerInfo": {
                    "id": "76561198000000001",
                    "name": "saberist",
                    "profilePicture": "https://cdn.scoresaber.com/avatars/x.jpg",
                    "country": "DE"
                },
                "rank": 4,
                "baseScore": 1142857.0,
                "modifiedScore": 1142857,
                "pp": 312.44,
                "weight": 0.92,
                "modifiers": "",
                "multiplier": 1.0,
                "badCuts": 1,
                "missedNotes": 2,
                "maxCombo": 451,
                "fullCombo": false,
                "hmd": 64,
                "timeSet": "1722540000000"
            },
            "leaderboard": {
                "id": 446905,
                "songHash": "9A6DA9A0A8BBA8C8C4E20D8A9E5A0F3E6D9C1B2A",
                "songName": "Ghost",
                "songSubName": "",
                "songAuthorName": "Camellia",
                "levelAuthorName": "cerret",
                "difficulty": {
                    "leaderboardId": 446905,
                    "difficulty": 9,
                    "gameMode": "SoloStandard",
                    "difficultyRaw": "_ExpertPlus_SoloStandard"
                },
                "maxScore": 1160555.0,
                "ranked": true,
                "qualified": false,
                "stars": 10.3
            }
        }
    }"#;

    const BEATLEADER_UPLOAD: &str = r#"{
        "id": 19377211,
        "baseScore": 995310,
        "modifiedScore": 995310,
        "accuracy": 0.9613,
        "playerId": "76561198000000002",
        "pp": 288.1,
        "rank": 2,
        "country": "AU",
        "modifiers": "",
        "badCuts": 0,
        "missedNotes": 1,
        "fullCombo": false,
        "maxCombo": 389,
        "leaderboardId": "xb2971",
        "timeset": "1722540123",
        "timepost": 1722540123,
        "player": {
            "id": "76561198000000002",
            "name": "blocksmith",
            "platform": "steam",
            "avatar": "https://cdn.beatleader.xyz/avatars/y.png",
            "country": "AU",
            "pp": 11402.2,
            "rank": 410,
            "role": ""
        },
        "leaderboard": {
            "id": "xb2971",
            "song": {
                "id": "xb297",
                "hash": "1B9E7A8C6D5E4F3A2B1C0D9E8F7A6B5C4D3E2F1A",
                "name": "Spin Eternally",
                "subName": "",
                "author": "Nanahira",
                "mapper": "Jabob"
            },
            "difficulty": {
                "id": 88123,
                "value": 9,
                "mode": 1,
                "difficultyName": "ExpertPlus",
                "modeName": "Standard",
                "status": 3,
                "stars": 9.1,
                "notes": 1833,
                "maxScore": 1035420
            }
        }
    }"#;

    #[test]
    fn test_scoresaber_accessors() {
        let msg = PlatformMessage::parse(Platform::ScoreSaber, SCORESABER_UPLOAD.as_bytes())
            .unwrap();

        assert_eq!(msg.platform(), Platform::ScoreSaber);
        assert_eq!(msg.score_id(), "91834502");
        assert_eq!(msg.player_id(), "76561198000000001");
        assert_eq!(msg.player_name(), "saberist");
        assert_eq!(msg.leaderboard_id(), "446905");
        assert_eq!(msg.leaderboard_name(), "Ghost");
        assert_eq!(msg.difficulty(), "_ExpertPlus_SoloStandard");
        assert_eq!(msg.region(), "DE");
        assert_eq!(msg.score(), 1142857);
        assert_eq!(msg.max_score(), 1160555);
        assert_eq!(msg.timestamp_ms(), 1722540000000);
        assert_eq!(msg.bad_cuts(), 1);
        assert_eq!(msg.missed_notes(), 2);
        assert!(msg.ranked());
    }

    #[test]
    fn test_beatleader_accessors() {
        let msg = PlatformMessage::parse(Platform::BeatLeader, BEATLEADER_UPLOAD.as_bytes())
            .unwrap();

        assert_eq!(msg.platform(), Platform::BeatLeader);
        assert_eq!(msg.score_id(), "19377211");
        assert_eq!(msg.player_id(), "76561198000000002");
        assert_eq!(msg.player_name(), "blocksmith");
        assert_eq!(msg.leaderboard_id(), "xb2971");
        assert_eq!(msg.leaderboard_name(), "Spin Eternally");
        assert_eq!(msg.difficulty(), "ExpertPlus");
        assert_eq!(msg.region(), "AU");
        assert_eq!(msg.score(), 995310);
        assert_eq!(msg.max_score(), 1035420);
        assert_eq!(msg.timestamp_ms(), 1722540123000);
        assert!(msg.ranked());
    }

    #[test]
    fn test_unranked_score_fails_predicate() {
        let raw = SCORESABER_UPLOAD.replace(r#""pp": 312.44"#, r#""pp": 0.0"#);
        let msg = PlatformMessage::parse(Platform::ScoreSaber, raw.as_bytes()).unwrap();
        assert!(!msg.ranked());
    }

    #[test]
    fn test_non_score_frame_is_unranked() {
        // the feed greets and heartbeats with sparse envelopes; they parse
        // into defaults and fail the ranked predicate rather than erroring
        let msg = PlatformMessage::parse(
            Platform::ScoreSaber,
            br#"{"commandName": "heartbeat"}"#,
        )
        .unwrap();
        assert!(!msg.ranked());
    }

    #[test]
    fn test_malformed_frame_is_an_error() {
        assert!(PlatformMessage::parse(Platform::ScoreSaber, b"hello from scoresaber").is_err());
        assert!(PlatformMessage::parse(Platform::BeatLeader, b"[1, 2, 3]").is_err());
    }

    #[test]
    fn test_into_event_round() {
        let event = PlatformMessage::parse(Platform::BeatLeader, BEATLEADER_UPLOAD.as_bytes())
            .unwrap()
            .into_event();

        assert_eq!(event.platform, Platform::BeatLeader);
        assert_eq!(event.score_id, "19377211");
        assert_eq!(event.region, "AU");
        assert_eq!(event.score, 995310);
        assert!(event.ranked);
    }

    #[test]
    fn test_platform_try_from() {
        assert_eq!(Platform::try_from(1), Ok(Platform::ScoreSaber));
        assert_eq!(Platform::try_from(2), Ok(Platform::BeatLeader));
        assert_eq!(Platform::try_from(3), Err(3));
    }
}
