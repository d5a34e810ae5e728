//! # Raffle Error Types
//!
//! All errors that can occur in the ledger, engine and store.

use thiserror::Error;

/// Errors that can occur in the raffle ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Contribution value was zero or negative.
    #[error("invalid amount: {value} (contributions must be greater than zero)")]
    InvalidAmount {
        /// The rejected value.
        value: i64,
    },

    /// Contribution was positive but below one ticket.
    #[error("no tickets granted: {value} is below the {ticket_rate} needed for one ticket")]
    NoTicketsGranted {
        /// The rejected value.
        value: i64,
        /// Value required per ticket.
        ticket_rate: u64,
    },

    /// Draw attempted while nobody holds a ticket.
    #[error("draw pool is empty")]
    EmptyPool,

    /// The stored ledger record does not have the expected shape.
    #[error("corrupt ledger state in {path}: {reason}")]
    CorruptState {
        /// Location of the record.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The stored ledger record could not be read or written.
    #[error("ledger storage unavailable at {path}: {reason}")]
    StorageUnavailable {
        /// Location of the record.
        path: String,
        /// Underlying I/O message.
        reason: String,
    },

    /// Arithmetic overflow in a ticket or value accumulator.
    #[error("arithmetic overflow in ticket calculation")]
    ArithmeticOverflow,

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RaffleError {
    /// Returns true for failures of the stored record rather than of the request.
    ///
    /// These are the ones an operator has to look at.
    #[must_use]
    pub const fn is_storage_fault(&self) -> bool {
        matches!(self, Self::CorruptState { .. } | Self::StorageUnavailable { .. })
    }
}

/// Result type for raffle operations.
pub type RaffleResult<T> = Result<T, RaffleError>;
