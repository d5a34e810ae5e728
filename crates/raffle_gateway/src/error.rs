//! # Gateway Error Types

use raffle_ledger::RaffleError;
use thiserror::Error;

/// Errors raised while turning a request into a ledger operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Caller is not an administrator.
    #[error("caller is not an administrator")]
    NotAdministrator,

    /// Command came from a channel other than the configured raffle channel.
    #[error("command sent outside the raffle channel")]
    WrongChannel,

    /// Command came from outside a server (e.g. a direct message).
    #[error("command sent outside a server")]
    OutsideGuild,

    /// First word of the line is not a command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Command recognised but its arguments are not.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// The ledger rejected the operation.
    #[error(transparent)]
    Raffle(#[from] RaffleError),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
