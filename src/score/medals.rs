/// Award for each zero-based rank in a top-10 table. A row pushed past the
/// table boundary settles at the rank-10 value of 0, which is what eviction
/// accounting relies on.
pub const MEDAL_VALUES: [i64; 10] = [10, 8, 6, 5, 4, 3, 2, 1, 1, 1];

pub fn medal_value(rank: usize) -> i64 {
    MEDAL_VALUES.get(rank).copied().unwrap_or(0)
}
