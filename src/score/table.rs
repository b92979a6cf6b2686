//! Pure planning for one reconciliation pass: given the current top-10 rows
//! for a key and an incoming score, decide how the table changes and what
//! every affected player's medal delta is. No storage access happens here,
//! which is what keeps the ranking rules directly testable.

use std::collections::HashMap;

use crate::constants::TOP_TABLE_SIZE;
use crate::db::prelude::RankedScore;
use crate::score::ScoreEvent;
use crate::score::medals::medal_value;

/// Outcome of planning one `(event, scope)` pair against a loaded table.
#[derive(Debug)]
pub enum Plan {
    /// The score does not make the table; nothing changes.
    NotQualified,
    /// The player already holds this exact rank; zero deltas, zero writes.
    Unimproved { rank: usize },
    Apply(TableUpdate),
}

/// Everything the persist step needs: the row to evict (table overflow), the
/// player's own prior row to remove, the resting rank of the new row, and
/// the medal delta of every player whose award changed.
#[derive(Debug)]
pub struct TableUpdate {
    pub rank: usize,
    pub evicted: Option<RankedScore>,
    pub replaced: Option<RankedScore>,
    pub deltas: HashMap<String, i64>,
}

/// A candidate makes the table while it has room, or by beating the current
/// 10th-place score.
pub fn qualifies(table: &[RankedScore], score: i64) -> bool {
    table.len() < TOP_TABLE_SIZE || table.last().is_none_or(|lowest| score > lowest.score)
}

pub fn plan(table: &[RankedScore], event: &ScoreEvent) -> Plan {
    if !qualifies(table, event.score) {
        return Plan::NotQualified;
    }

    let prior = table
        .iter()
        .position(|row| row.player_id.0 == event.player_id);

    // The table with the player's own row vacated, keyed by old index. The
    // new row's resting rank and every shift fall out of comparing old and
    // new positions, including the cancellation below a vacated row.
    let remaining: Vec<(usize, &RankedScore)> = table
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != prior)
        .collect();

    let rank = remaining
        .iter()
        .position(|(_, row)| event.score > row.score)
        .unwrap_or(remaining.len());

    if prior == Some(rank) {
        return Plan::Unimproved { rank };
    }

    let mut deltas: HashMap<String, i64> = HashMap::new();
    let mut evicted = None;

    for (new_pos, (old_idx, row)) in remaining.iter().enumerate() {
        let new_idx = if new_pos >= rank { new_pos + 1 } else { new_pos };
        if new_idx == *old_idx {
            continue;
        }

        if new_idx >= TOP_TABLE_SIZE {
            // pushed past the boundary; the boundary rank is worth 0
            evicted = Some((*row).clone());
        }

        let delta = medal_value(new_idx) - medal_value(*old_idx);
        if delta != 0 {
            deltas.insert(row.player_id.0.clone(), delta);
        }
    }

    let own_delta = match prior {
        Some(p) => medal_value(rank) - medal_value(p),
        None => medal_value(rank),
    };
    if own_delta != 0 {
        deltas.insert(event.player_id.clone(), own_delta);
    }

    Plan::Apply(TableUpdate {
        rank,
        evicted,
        replaced: prior.map(|p| table[p].clone()),
        deltas,
    })
}
