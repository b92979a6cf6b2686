use std::time::Duration;

pub const SCORESABER_WS_URL: &str = "wss://scoresaber.com/ws";
pub const BEATLEADER_WS_URL: &str = "wss://sockets.api.beatleader.com/scores";

/// Wait this long before redialing a dropped feed. There is no retry ceiling.
pub const FEED_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on any single storage call. An elapsed deadline fails that
/// call only, never the worker.
pub const STORAGE_DEADLINE: Duration = Duration::from_secs(10);

pub const TOP_TABLE_SIZE: usize = 10;
pub const HISTORY_PAGE_SIZE: i64 = 10;

/// The scope every accepted score is ranked under in addition to the
/// player's own region.
pub const GLOBAL_SCOPE: &str = "Global";
