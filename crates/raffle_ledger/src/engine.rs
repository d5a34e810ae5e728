//! # Raffle Engine
//!
//! **Value to tickets, weighted pool, uniform draw.**
//!
//! Every operation here is a plain function of a [`Ledger`]: nothing is read
//! from or written to storage, and randomness is always passed in by the
//! caller.
//!
//! ## Weighting
//!
//! Each ticket is one entry in the draw pool, so a participant holding `n`
//! of `N` tickets wins with probability `n / N`:
//!
//! ```text
//! ledger:  a=3  b=1  c=0
//! pool:    [a, a, a, b]          (c holds no tickets, so it is absent)
//! draw:    index = uniform(0..4) -> pool[index]
//! ```
//!
//! `draw` walks the cumulative ticket counts in ledger order instead of
//! building the pool, so position `i` of the walk is exactly
//! `build_pool(ledger)[i]`.

use rand::Rng;

use crate::config::RafflePolicy;
use crate::error::{RaffleError, RaffleResult};
use crate::ledger::{Ledger, Participant, ParticipantId};

/// Outcome of a successful grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrantReceipt {
    /// Tickets bought by this contribution.
    pub gained: u64,
    /// Participant's tickets after the grant.
    pub ticket_count: u64,
    /// Participant's accumulated value after the grant.
    pub total_contributed: u64,
}

/// The raffle rules for one policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RaffleEngine {
    policy: RafflePolicy,
}

impl RaffleEngine {
    /// Creates an engine for the given policy.
    #[must_use]
    pub const fn new(policy: RafflePolicy) -> Self {
        Self { policy }
    }

    /// The policy this engine applies.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> RafflePolicy {
        self.policy
    }

    /// Converts a contribution into whole tickets (floor division).
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if `value <= 0`, and `InvalidConfig` if the
    /// policy's ticket rate is zero.
    pub fn tickets_for(&self, value: i64) -> RaffleResult<u64> {
        let value = positive(value)?;
        value.checked_div(self.policy.ticket_rate).ok_or_else(|| {
            RaffleError::InvalidConfig("ticket_rate must be greater than zero".to_string())
        })
    }

    /// Records a contribution.
    ///
    /// The ledger is only touched once the contribution is known to buy at
    /// least one ticket and both accumulators have room; on any error it is
    /// left exactly as it was.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `value <= 0`
    /// - `NoTicketsGranted` if `value` is below one ticket
    /// - `ArithmeticOverflow` if an accumulator would overflow
    pub fn grant(
        &self,
        ledger: &mut Ledger,
        id: impl Into<ParticipantId>,
        display_name: &str,
        value: i64,
    ) -> RaffleResult<GrantReceipt> {
        let gained = self.tickets_for(value)?;
        if gained == 0 {
            tracing::warn!(
                "Contribution of {} rejected: below the {} needed for one ticket",
                value,
                self.policy.ticket_rate
            );
            return Err(RaffleError::NoTicketsGranted {
                value,
                ticket_rate: self.policy.ticket_rate,
            });
        }
        let value = positive(value)?;
        let id = id.into();

        let (total, tickets) = ledger
            .get(id.as_str())
            .map_or((0, 0), |p| (p.total_contributed, p.ticket_count));
        let total_contributed = total
            .checked_add(value)
            .ok_or(RaffleError::ArithmeticOverflow)?;
        let ticket_count = tickets
            .checked_add(gained)
            .ok_or(RaffleError::ArithmeticOverflow)?;

        let record = ledger.record_mut(id.clone());
        record.display_name = display_name.to_string();
        record.total_contributed = total_contributed;
        record.ticket_count = ticket_count;

        tracing::info!(
            "Granted {} ticket(s) to {} ({}): now {} ticket(s), {} contributed",
            gained,
            id,
            display_name,
            ticket_count,
            total_contributed
        );

        Ok(GrantReceipt {
            gained,
            ticket_count,
            total_contributed,
        })
    }

    /// Looks up one participant. `None` is a valid answer, not an error.
    #[must_use]
    pub fn status<'a>(&self, ledger: &'a Ledger, id: &str) -> Option<&'a Participant> {
        ledger.get(id)
    }

    /// Flattens the ledger into one entry per ticket, in ledger order.
    ///
    /// Participants without tickets contribute nothing.
    #[must_use]
    pub fn build_pool<'a>(&self, ledger: &'a Ledger) -> Vec<&'a ParticipantId> {
        ledger
            .iter()
            .flat_map(|(id, p)| {
                let count = usize::try_from(p.ticket_count).unwrap_or(usize::MAX);
                std::iter::repeat(id).take(count)
            })
            .collect()
    }

    /// Total tickets in the pool.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the sum does not fit in a `u64`.
    pub fn pool_size(&self, ledger: &Ledger) -> RaffleResult<u64> {
        ledger
            .iter()
            .try_fold(0u64, |acc, (_, p)| acc.checked_add(p.ticket_count))
            .ok_or(RaffleError::ArithmeticOverflow)
    }

    /// Owner of the ticket at `index` in pool order, if the pool is that large.
    #[must_use]
    pub fn ticket_owner<'a>(&self, ledger: &'a Ledger, index: u64) -> Option<&'a ParticipantId> {
        let mut remaining = index;
        for (id, p) in ledger.iter() {
            if remaining < p.ticket_count {
                return Some(id);
            }
            remaining -= p.ticket_count;
        }
        None
    }

    /// Draws one winner; every ticket is equally likely.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPool` if nobody holds a ticket, and `ArithmeticOverflow`
    /// if the ticket total does not fit in a `u64`.
    pub fn draw<'a, R: Rng>(&self, ledger: &'a Ledger, rng: &mut R) -> RaffleResult<&'a ParticipantId> {
        let total = self.pool_size(ledger)?;
        if total == 0 {
            tracing::warn!("Draw attempted with an empty pool");
            return Err(RaffleError::EmptyPool);
        }

        let index = rng.gen_range(0..total);
        let winner = self
            .ticket_owner(ledger, index)
            .ok_or(RaffleError::EmptyPool)?;

        tracing::info!("Drew ticket {} of {}: winner {}", index, total, winner);
        Ok(winner)
    }

    /// A fresh, empty ledger.
    #[must_use]
    pub fn reset(&self) -> Ledger {
        Ledger::new()
    }

    /// All participants, most tickets first.
    ///
    /// Ties keep ledger (id) order.
    #[must_use]
    pub fn ranked_list<'a>(&self, ledger: &'a Ledger) -> Vec<(&'a ParticipantId, &'a Participant)> {
        let mut ranked: Vec<_> = ledger.iter().collect();
        ranked.sort_by(|a, b| b.1.ticket_count.cmp(&a.1.ticket_count));
        ranked
    }
}

/// Rejects non-positive contributions.
fn positive(value: i64) -> RaffleResult<u64> {
    u64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or(RaffleError::InvalidAmount { value })
}
