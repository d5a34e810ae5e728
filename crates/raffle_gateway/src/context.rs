//! # Raffle Context
//!
//! The one object every command handler works through. It owns the ledger
//! store and the draw RNG behind a single mutex, so each command runs
//! load -> mutate -> save as one critical section even when the host
//! dispatches handlers concurrently.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raffle_ledger::{
    GrantReceipt, JsonFileStore, LedgerStore, Participant, ParticipantId, RaffleConfig,
    RaffleEngine, RafflePolicy, RaffleResult, Standings,
};

/// State guarded by the context lock.
struct Session<S, R> {
    store: S,
    rng: R,
}

/// Store, engine and RNG for one running raffle.
pub struct RaffleContext<S, R = StdRng> {
    engine: RaffleEngine,
    raffle_channel_id: Option<String>,
    session: Mutex<Session<S, R>>,
}

impl RaffleContext<JsonFileStore, StdRng> {
    /// Builds the production context: JSON file store at `config.data_file`
    /// and an RNG seeded from system entropy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the policy values are invalid.
    pub fn from_config(config: &RaffleConfig) -> RaffleResult<Self> {
        Self::new(
            config,
            JsonFileStore::new(config.data_file.clone()),
            StdRng::from_entropy(),
        )
    }
}

impl<S: LedgerStore, R: Rng> RaffleContext<S, R> {
    /// Builds a context from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the policy values are invalid.
    pub fn new(config: &RaffleConfig, store: S, rng: R) -> RaffleResult<Self> {
        config.validate()?;
        tracing::info!(
            "Raffle context ready: ledger at {}, {} per ticket, prize {}",
            store.location(),
            config.ticket_rate,
            config.prize_value
        );
        Ok(Self {
            engine: RaffleEngine::new(config.policy()),
            raffle_channel_id: config.raffle_channel_id.clone(),
            session: Mutex::new(Session { store, rng }),
        })
    }

    /// Policy in force.
    #[must_use]
    pub const fn policy(&self) -> RafflePolicy {
        self.engine.policy()
    }

    /// Channel commands are restricted to, if any.
    #[must_use]
    pub fn raffle_channel_id(&self) -> Option<&str> {
        self.raffle_channel_id.as_deref()
    }

    /// Records a contribution and persists it.
    ///
    /// # Errors
    ///
    /// Engine rejections (`InvalidAmount`, `NoTicketsGranted`,
    /// `ArithmeticOverflow`) leave the record untouched; storage failures are
    /// passed through.
    pub fn grant(&self, member: &ParticipantId, display_name: &str, value: i64) -> RaffleResult<GrantReceipt> {
        let session = self.session.lock();
        let mut ledger = session.store.load()?;
        let receipt = self.engine.grant(&mut ledger, member.clone(), display_name, value)?;
        session.store.save(&ledger)?;
        Ok(receipt)
    }

    /// One participant's record, or `None` if they have none.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub fn status(&self, member: &ParticipantId) -> RaffleResult<Option<Participant>> {
        let session = self.session.lock();
        let ledger = session.store.load()?;
        Ok(self.engine.status(&ledger, member.as_str()).cloned())
    }

    /// Every participant, most tickets first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub fn list(&self) -> RaffleResult<Vec<(ParticipantId, Participant)>> {
        let session = self.session.lock();
        let ledger = session.store.load()?;
        Ok(self
            .engine
            .ranked_list(&ledger)
            .into_iter()
            .map(|(id, p)| (id.clone(), p.clone()))
            .collect())
    }

    /// Aggregate figures over the whole ledger.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub fn standings(&self) -> RaffleResult<Standings> {
        let session = self.session.lock();
        Ok(session.store.load()?.standings())
    }

    /// Draws a winner. The ledger is not modified.
    ///
    /// # Errors
    ///
    /// `EmptyPool` if nobody holds a ticket, or a storage failure.
    pub fn draw(&self) -> RaffleResult<ParticipantId> {
        let mut session = self.session.lock();
        let ledger = session.store.load()?;
        let winner = self.engine.draw(&ledger, &mut session.rng)?;
        Ok(winner.clone())
    }

    /// Removes every participant.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub fn reset(&self) -> RaffleResult<()> {
        let session = self.session.lock();
        session.store.save(&self.engine.reset())?;
        tracing::info!("Raffle reset: ledger at {} cleared", session.store.location());
        Ok(())
    }

    /// Tears the context down and hands back the store.
    pub fn shutdown(self) -> S {
        let session = self.session.into_inner();
        tracing::info!("Raffle context shut down: ledger at {}", session.store.location());
        session.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use raffle_ledger::{MemoryStore, RaffleError};
    use std::sync::Arc;

    fn context() -> RaffleContext<MemoryStore, ChaCha8Rng> {
        RaffleContext::new(
            &RaffleConfig::default(),
            MemoryStore::new(),
            ChaCha8Rng::seed_from_u64(5),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = RaffleConfig {
            ticket_rate: 0,
            ..RaffleConfig::default()
        };
        let result = RaffleContext::new(&config, MemoryStore::new(), ChaCha8Rng::seed_from_u64(0));
        assert!(matches!(result, Err(RaffleError::InvalidConfig(_))));
    }

    #[test]
    fn test_grant_persists() {
        let ctx = context();
        let id = ParticipantId::from("1");

        ctx.grant(&id, "Ana", 12_000).unwrap();

        let store = ctx.shutdown();
        let ledger = store.load().unwrap();
        assert_eq!(ledger.get("1").unwrap().ticket_count, 2);
    }

    #[test]
    fn test_rejected_grant_does_not_save() {
        let ctx = context();
        let id = ParticipantId::from("1");

        assert!(ctx.grant(&id, "Ana", 100).is_err());

        let store = ctx.shutdown();
        assert!(store.record().is_none());
    }

    #[test]
    fn test_status_list_draw_reset() {
        let ctx = context();
        let ana = ParticipantId::from("1");
        let bia = ParticipantId::from("2");
        ctx.grant(&ana, "Ana", 5000).unwrap();
        ctx.grant(&bia, "Bia", 20_000).unwrap();

        assert_eq!(ctx.status(&ana).unwrap().unwrap().ticket_count, 1);
        assert!(ctx.status(&ParticipantId::from("3")).unwrap().is_none());

        let list = ctx.list().unwrap();
        assert_eq!(list[0].0, bia);
        assert_eq!(list[1].0, ana);
        assert_eq!(ctx.standings().unwrap().total_tickets, 5);

        let winner = ctx.draw().unwrap();
        assert!(winner == ana || winner == bia);

        ctx.reset().unwrap();
        assert!(ctx.list().unwrap().is_empty());
        assert_eq!(ctx.draw(), Err(RaffleError::EmptyPool));
    }

    #[test]
    fn test_concurrent_grants_do_not_lose_updates() {
        let ctx = Arc::new(context());
        let threads = 8;
        let grants_per_thread = 25;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                std::thread::spawn(move || {
                    let id = ParticipantId::from("shared");
                    for _ in 0..grants_per_thread {
                        ctx.grant(&id, "Shared", 5000).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let p = ctx.status(&ParticipantId::from("shared")).unwrap().unwrap();
        assert_eq!(p.ticket_count, threads * grants_per_thread);
        assert_eq!(p.total_contributed, threads * grants_per_thread * 5000);
    }
}
