//! # Raffle Gateway
//!
//! The layer between a chat platform and the raffle ledger.
//!
//! ## The Command Pipeline
//!
//! ```text
//! line/interaction -> Command::parse() -> RaffleGateway::handle()
//!   1. Validate caller (administrator, raffle channel, inside a server)
//!   2. Lock the context
//!   3. Load ledger
//!   4. Run the engine operation
//!   5. Save (mutating commands only)
//!   6. Render the reply
//! ```
//!
//! Nothing here is global: a [`RaffleContext`] is built at startup, handed to
//! a [`RaffleGateway`], and torn down with [`RaffleGateway::shutdown`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod command;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod reply;

pub use command::{Command, Member};
pub use context::RaffleContext;
pub use dispatch::{Caller, RaffleGateway};
pub use error::{GatewayError, GatewayResult};
pub use reply::Reply;
