use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::instrument;

use crate::db::DbResult;
use crate::db::prelude::{MedalChange, Player, Store};
use crate::score::{ScoreEvent, ScoreResult};

/// Serializes first-time player creation process-wide. Creation happens once
/// per player ever, so one coarse lock is enough; the re-query after
/// acquisition is what makes the check-then-create race-safe.
static PLAYER_CREATE_LOCK: Mutex<()> = Mutex::const_new(());

/// Applies one pass's medal deltas to player balances. Pure accumulation:
/// `new_total = current_total + delta`, no clamping, no deduplication — the
/// handler owns computing each pass's deltas exactly once.
pub struct MedalLedger {
    store: Arc<dyn Store>,
}

impl MedalLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, event, deltas), fields(count = deltas.len(), scope))]
    pub async fn apply(
        &self,
        event: &ScoreEvent,
        scope: &str,
        deltas: &HashMap<String, i64>,
    ) -> ScoreResult<()> {
        for (player_id, delta) in deltas {
            self.load_or_create(event, player_id).await?;
            self.store
                .add_medals(event.platform, player_id, *delta)
                .await?;

            let change = MedalChange::from_event(event, scope, player_id, *delta);
            if let Err(e) = self.store.insert_change(&change).await {
                // the balance update stands; history just has a gap
                tracing::error!(error = ?e, player_id = %player_id, "failed to record medal change");
            }
        }

        Ok(())
    }

    /// Fetch the player's account, creating it on first sight. Only the
    /// submitting player carries identity on the event; a shifted player
    /// missing its account (it was seeded out-of-band, say) gets a bare one.
    async fn load_or_create(&self, event: &ScoreEvent, player_id: &str) -> DbResult<Player> {
        if let Some(player) = self.store.player(event.platform, player_id).await? {
            return Ok(player);
        }

        let _guard = PLAYER_CREATE_LOCK.lock().await;
        if let Some(player) = self.store.player(event.platform, player_id).await? {
            return Ok(player);
        }

        let player = if player_id == event.player_id {
            Player::new(event.platform, player_id, &event.region, &event.player_name)
        } else {
            Player::new(event.platform, player_id, "", "")
        };

        tracing::debug!(player_id, platform = %event.platform, "creating player account");
        self.store.insert_player(&player).await?;

        Ok(player)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::memory::MemStore;
    use crate::score::Platform;

    fn event(player: &str, score: i64) -> ScoreEvent {
        ScoreEvent {
            platform: Platform::BeatLeader,
            score_id: "19377211".to_string(),
            player_id: player.to_string(),
            player_name: "blocksmith".to_string(),
            leaderboard_id: "xb2971".to_string(),
            leaderboard_name: "Spin Eternally".to_string(),
            difficulty: "ExpertPlus".to_string(),
            region: "AU".to_string(),
            score,
            max_score: 1_035_420,
            timestamp: 1_722_540_123_000,
            modifiers: String::new(),
            bad_cuts: 0,
            missed_notes: 0,
            ranked: true,
        }
    }

    #[tokio::test]
    async fn test_creates_player_once_and_accumulates() {
        let store = Arc::new(MemStore::new());
        let ledger = MedalLedger::new(store.clone());
        let ev = event("player-a", 900_000);

        let deltas = HashMap::from([("player-a".to_string(), 10)]);
        ledger.apply(&ev, "AU", &deltas).await.unwrap();

        let created = store
            .player(Platform::BeatLeader, "player-a")
            .await
            .unwrap()
            .expect("account created lazily");
        assert_eq!(created.region, "AU");
        assert_eq!(created.name, "blocksmith");
        assert_eq!(created.medals, 10);

        let deltas = HashMap::from([("player-a".to_string(), -4)]);
        ledger.apply(&ev, "AU", &deltas).await.unwrap();

        assert_eq!(store.medal_total(Platform::BeatLeader, "player-a").await, 6);
        // one change row per applied delta
        assert_eq!(store.change_rows().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_creation() {
        let store = Arc::new(MemStore::new());
        let ledger = Arc::new(MedalLedger::new(store.clone()));
        let ev = event("player-b", 900_000);

        let deltas = HashMap::from([("player-b".to_string(), 3)]);
        let (a, b) = tokio::join!(
            ledger.apply(&ev, "AU", &deltas),
            ledger.apply(&ev, "Global", &deltas),
        );
        a.unwrap();
        b.unwrap();

        // both passes applied their delta against a single account
        assert_eq!(store.medal_total(Platform::BeatLeader, "player-b").await, 6);
    }

    #[tokio::test]
    async fn test_shifted_player_gets_bare_account() {
        let store = Arc::new(MemStore::new());
        let ledger = MedalLedger::new(store.clone());
        let ev = event("submitter", 900_000);

        let deltas = HashMap::from([("bystander".to_string(), -2)]);
        ledger.apply(&ev, "AU", &deltas).await.unwrap();

        let created = store
            .player(Platform::BeatLeader, "bystander")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.name, "");
        assert_eq!(created.medals, -2);
    }
}
