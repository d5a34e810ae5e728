//! # Replies
//!
//! Text rendered back to the chat. Mentions use the `<@id>` form, amounts are
//! grouped in thousands with `.` (`10.000`).

use raffle_ledger::{GrantReceipt, Participant, ParticipantId, RaffleError, RafflePolicy};

use crate::error::GatewayError;

/// A reply to one command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// Message body.
    pub text: String,
    /// Only the caller should see it.
    pub ephemeral: bool,
}

impl Reply {
    /// A reply visible to the whole channel.
    #[must_use]
    pub fn public(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: false,
        }
    }

    /// A reply only the caller sees.
    #[must_use]
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }
}

/// `<@id>`
#[must_use]
pub fn mention(id: &ParticipantId) -> String {
    format!("<@{id}>")
}

/// Groups digits in thousands with `.`.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

pub(crate) fn granted(id: &ParticipantId, receipt: &GrantReceipt) -> Reply {
    Reply::public(format!(
        "✅ {} received **{} ticket(s)**. Current total: **{} ticket(s)** ({} contributed).",
        mention(id),
        receipt.gained,
        receipt.ticket_count,
        group_thousands(receipt.total_contributed)
    ))
}

pub(crate) fn status(id: &ParticipantId, participant: Option<&Participant>) -> Reply {
    match participant {
        Some(p) => Reply::public(format!(
            "📌 {}: {} ticket(s), {} contributed.",
            mention(id),
            p.ticket_count,
            group_thousands(p.total_contributed)
        )),
        None => Reply::public(format!("{} has no tickets yet.", mention(id))),
    }
}

pub(crate) fn list(entries: &[(ParticipantId, Participant)]) -> Reply {
    if entries.is_empty() {
        return Reply::public("No participants registered yet.");
    }

    let mut lines = vec!["🎟️ **Raffle participants**".to_string()];
    lines.extend(entries.iter().map(|(_, p)| {
        format!(
            "- {}: {} ticket(s) | {}",
            p.display_name,
            p.ticket_count,
            group_thousands(p.total_contributed)
        )
    }));
    Reply::public(lines.join("\n"))
}

pub(crate) fn winner(id: &ParticipantId, policy: RafflePolicy) -> Reply {
    Reply::public(format!(
        "🏆 **RAFFLE RESULT** 🏆\nWinner: {}\nPrize: **{}**",
        mention(id),
        group_thousands(policy.prize_value)
    ))
}

pub(crate) fn reset() -> Reply {
    Reply::public("♻️ Raffle reset. All participants and tickets were removed.")
}

pub(crate) fn help() -> Reply {
    Reply::ephemeral(
        [
            "Raffle commands:",
            "  add <user_id> <value> <display name>  grant tickets for a contribution",
            "  status <user_id>                      show one participant",
            "  list                                  show all participants",
            "  draw                                  draw one winner",
            "  reset                                 remove all participants",
        ]
        .join("\n"),
    )
}

/// Renders a failure. Only an empty pool is announced to the channel.
pub(crate) fn failure(err: &GatewayError, policy: RafflePolicy) -> Reply {
    match err {
        GatewayError::NotAdministrator => {
            Reply::ephemeral("You do not have permission to use this command.")
        }
        GatewayError::WrongChannel => {
            Reply::ephemeral("Use raffle commands only in the configured raffle channel.")
        }
        GatewayError::OutsideGuild => {
            Reply::ephemeral("This command can only be used inside a server.")
        }
        GatewayError::UnknownCommand(word) => {
            Reply::ephemeral(format!("Unknown command `{word}`. Try `help`."))
        }
        GatewayError::Usage(usage) => Reply::ephemeral(format!("Usage: {usage}")),
        GatewayError::Raffle(raffle) => match raffle {
            RaffleError::InvalidAmount { .. } => {
                Reply::ephemeral("The contribution must be greater than 0.")
            }
            RaffleError::NoTicketsGranted { ticket_rate, .. } => Reply::ephemeral(format!(
                "That amount does not buy a ticket. At least {} is needed per ticket.",
                group_thousands(*ticket_rate)
            )),
            RaffleError::EmptyPool => Reply::public("There are no tickets to draw from."),
            RaffleError::ArithmeticOverflow => {
                Reply::ephemeral("That contribution is too large to record.")
            }
            RaffleError::CorruptState { .. } => Reply::ephemeral(
                "⚠️ The raffle ledger is damaged and was left untouched. Ask the operator to check it.",
            ),
            RaffleError::StorageUnavailable { .. } => Reply::ephemeral(
                "⚠️ The raffle ledger is unavailable right now. Nothing was changed.",
            ),
            RaffleError::InvalidConfig(_) => Reply::ephemeral(format!(
                "⚠️ The raffle is misconfigured (ticket rate {}).",
                policy.ticket_rate
            )),
        },
    }
}
