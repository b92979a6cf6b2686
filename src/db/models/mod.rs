use serde::Deserialize;

pub mod change;
pub mod player;
pub mod score;

#[inline]
const fn default_page() -> i64 {
    0
}

/// Query params for the paginated read routes. Pages are fixed-size
/// ([`crate::constants::HISTORY_PAGE_SIZE`] rows).
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
}

/// Pagination plus the optional timestamp window the history routes accept.
/// `before`/`after` are epoch milliseconds; absent means unbounded.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    pub before: Option<i64>,
    pub after: Option<i64>,
}
