use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::instrument;

use crate::constants::GLOBAL_SCOPE;
use crate::db::prelude::{RankedScore, Store};
use crate::score::ledger::MedalLedger;
use crate::score::table::{self, Plan};
use crate::score::{Platform, PlatformMessage, ScoreEvent, ScoreResult};

type TableKey = (Platform, String, String);

/// Serializes reconciliation per `(platform, leaderboard, scope)`. Without
/// this, two passes for the same key race the read-modify-write over the
/// table: lost updates, duplicate players, double evictions.
#[derive(Debug, Default)]
pub struct TableLocks {
    inner: Mutex<HashMap<TableKey, Arc<Mutex<()>>>>,
}

impl TableLocks {
    async fn acquire(
        &self,
        platform: Platform,
        leaderboard_id: &str,
        scope: &str,
    ) -> OwnedMutexGuard<()> {
        let key = (platform, leaderboard_id.to_string(), scope.to_string());
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(key).or_default())
        };

        lock.lock_owned().await
    }
}

/// Takes raw feed bytes all the way to persisted table and ledger changes:
/// normalize, filter, fan out per scope, plan, persist, apply deltas.
pub struct ScoreHandler {
    store: Arc<dyn Store>,
    ledger: MedalLedger,
    locks: TableLocks,
}

impl ScoreHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            ledger: MedalLedger::new(Arc::clone(&store)),
            store,
            locks: TableLocks::default(),
        }
    }

    /// Feed entry point. A message that fails to parse is dropped and
    /// logged; an unranked score is dropped silently. Neither is a fault.
    #[instrument(skip(self, raw), fields(platform = %platform, bytes = raw.len()))]
    pub async fn ingest(&self, platform: Platform, raw: &[u8]) {
        let message = match PlatformMessage::parse(platform, raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparseable feed message");
                return;
            }
        };

        if !message.ranked() {
            return;
        }

        self.dispatch(&message.into_event()).await;
    }

    /// Fans one accepted event into two independent passes: the player's
    /// region and the global table. They run concurrently, share no
    /// transactional state, and a failure in one never rolls back the other.
    pub async fn dispatch(&self, event: &ScoreEvent) {
        if !event.ranked {
            return;
        }

        let (region_pass, global_pass) = tokio::join!(
            self.reconcile(event, &event.region),
            self.reconcile(event, GLOBAL_SCOPE),
        );

        let outcomes = [(event.region.as_str(), region_pass), (GLOBAL_SCOPE, global_pass)];
        for (scope, result) in outcomes {
            if let Err(e) = result {
                tracing::error!(
                    error = ?e,
                    scope,
                    player_id = %event.player_id,
                    leaderboard_id = %event.leaderboard_id,
                    "pass abandoned",
                );
            }
        }
    }

    /// One complete pass for one `(event, scope)` pair.
    #[instrument(skip(self, event), fields(
        platform = %event.platform,
        player_id = %event.player_id,
        leaderboard_id = %event.leaderboard_id,
        scope,
    ))]
    async fn reconcile(&self, event: &ScoreEvent, scope: &str) -> ScoreResult<()> {
        let _guard = self
            .locks
            .acquire(event.platform, &event.leaderboard_id, scope)
            .await;

        let current = self
            .store
            .top_scores(event.platform, &event.leaderboard_id, scope)
            .await?;

        let update = match table::plan(&current, event) {
            Plan::NotQualified => {
                tracing::trace!("score outside the table, nothing to do");
                return Ok(());
            }
            Plan::Unimproved { rank } => {
                tracing::info!(
                    rank,
                    player = %event.player_name,
                    leaderboard = %event.leaderboard_name,
                    "rank unchanged, skipping resubmission",
                );
                return Ok(());
            }
            Plan::Apply(update) => update,
        };

        // write order matters: clear the vacated rows before inserting so a
        // mid-pass failure never leaves two rows for one player
        if let Some(evicted) = &update.evicted {
            self.store
                .delete_score(
                    evicted.platform,
                    &evicted.leaderboard_id,
                    &evicted.scope,
                    &evicted.score_id,
                )
                .await?;
        }

        if let Some(replaced) = &update.replaced {
            self.store
                .delete_score(
                    replaced.platform,
                    &replaced.leaderboard_id,
                    &replaced.scope,
                    &replaced.score_id,
                )
                .await?;
        }

        self.store
            .insert_score(&RankedScore::from_event(event, scope))
            .await?;

        self.ledger.apply(event, scope, &update.deltas).await?;

        tracing::info!(
            rank = update.rank,
            player = %event.player_name,
            leaderboard = %event.leaderboard_name,
            difficulty = %event.difficulty,
            "score placed",
        );

        Ok(())
    }
}
