//! # Commands
//!
//! The five raffle operations plus `help`, and the console syntax for them:
//!
//! ```text
//! add <user_id> <value> <display name...>
//! status <user_id>
//! list
//! draw
//! reset
//! help
//! ```
//!
//! A leading `/` is accepted so slash-command habits carry over.

use raffle_ledger::ParticipantId;

use crate::error::{GatewayError, GatewayResult};

const ADD_USAGE: &str = "add <user_id> <value> <display name>";
const STATUS_USAGE: &str = "status <user_id>";

/// A server member as the platform reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    /// Platform user id.
    pub id: ParticipantId,
    /// Current display name.
    pub display_name: String,
}

/// One raffle command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Grant tickets for a contributed value.
    Add {
        /// Who contributed.
        member: Member,
        /// Contributed value, validated by the engine.
        value: i64,
    },
    /// Show one participant's totals.
    Status {
        /// Who to look up.
        id: ParticipantId,
    },
    /// Show every participant, most tickets first.
    List,
    /// Draw one winner.
    Draw,
    /// Remove every participant.
    Reset,
    /// Show the command summary.
    Help,
}

impl Command {
    /// Parses one console line.
    ///
    /// # Errors
    ///
    /// `UnknownCommand` for an unrecognised first word, `Usage` for missing or
    /// malformed arguments.
    pub fn parse(line: &str) -> GatewayResult<Self> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));
        let word = word.strip_prefix('/').unwrap_or(word).to_ascii_lowercase();

        match word.as_str() {
            "add" => Self::parse_add(rest),
            "status" => {
                let mut args = rest.split_whitespace();
                match (args.next(), args.next()) {
                    (Some(id), None) => Ok(Self::Status { id: ParticipantId::from(id) }),
                    _ => Err(GatewayError::Usage(STATUS_USAGE)),
                }
            }
            "list" => Ok(Self::List),
            "draw" => Ok(Self::Draw),
            "reset" => Ok(Self::Reset),
            "help" => Ok(Self::Help),
            _ => Err(GatewayError::UnknownCommand(word)),
        }
    }

    fn parse_add(rest: &str) -> GatewayResult<Self> {
        let mut parts = rest.splitn(3, char::is_whitespace);
        let id = parts.next().filter(|s| !s.is_empty());
        let value = parts.next().and_then(|v| v.parse::<i64>().ok());
        let display_name = parts.next().map(str::trim).filter(|s| !s.is_empty());

        match (id, value, display_name) {
            (Some(id), Some(value), Some(display_name)) => Ok(Self::Add {
                member: Member {
                    id: ParticipantId::from(id),
                    display_name: display_name.to_string(),
                },
                value,
            }),
            _ => Err(GatewayError::Usage(ADD_USAGE)),
        }
    }

    /// Command name as typed.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Status { .. } => "status",
            Self::List => "list",
            Self::Draw => "draw",
            Self::Reset => "reset",
            Self::Help => "help",
        }
    }
}
