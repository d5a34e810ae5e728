//! # Raffle Ledger
//!
//! Ticket bookkeeping and weighted draws for a community raffle.
//!
//! ## Design Principles
//!
//! 1. **Integer tickets** - one ticket per full `ticket_rate` of contributed value
//! 2. **Stored, not recomputed** - ticket counts only ever grow through `grant`
//! 3. **Whole-file persistence** - every save rewrites the complete ledger
//! 4. **Injected randomness** - the engine never owns an RNG
//!
//! ## Example
//!
//! ```rust,ignore
//! use raffle_ledger::{JsonFileStore, LedgerStore, RaffleEngine, RafflePolicy};
//!
//! let store = JsonFileStore::new("raffle_data.json");
//! let engine = RaffleEngine::new(RafflePolicy::default());
//!
//! let mut ledger = store.load()?;
//! engine.grant(&mut ledger, "1001", "Ana", 12_000)?;
//! store.save(&ledger)?;
//!
//! let winner = engine.draw(&ledger, &mut rng)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod store;

pub use config::{RaffleConfig, RafflePolicy, PRIZE_VALUE, TICKET_RATE};
pub use engine::{GrantReceipt, RaffleEngine};
pub use error::{RaffleError, RaffleResult};
pub use ledger::{Ledger, Participant, ParticipantId, Standings};
pub use store::{JsonFileStore, LedgerStore, MemoryStore};
