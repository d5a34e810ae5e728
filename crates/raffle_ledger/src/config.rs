//! # Raffle Configuration
//!
//! Policy constants and file locations, loaded once at startup from TOML.
//!
//! ```toml
//! data_file = "raffle_data.json"
//! ticket_rate = 5000
//! prize_value = 10000
//! raffle_channel_id = "123456789"
//! ```
//!
//! Every key is optional. `RAFFLE_DATA_FILE` and `RAFFLE_CHANNEL_ID` in the
//! environment override the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{RaffleError, RaffleResult};

/// Contributed value per ticket.
pub const TICKET_RATE: u64 = 5000;

/// Announced prize amount.
pub const PRIZE_VALUE: u64 = 10_000;

/// Default ledger record location.
pub const DEFAULT_DATA_FILE: &str = "raffle_data.json";

/// Environment variable overriding `data_file`.
pub const ENV_DATA_FILE: &str = "RAFFLE_DATA_FILE";

/// Environment variable overriding `raffle_channel_id`.
pub const ENV_CHANNEL_ID: &str = "RAFFLE_CHANNEL_ID";

/// Policy constants of one raffle. Neither is computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RafflePolicy {
    /// Contributed value per ticket.
    pub ticket_rate: u64,
    /// Announced prize amount.
    pub prize_value: u64,
}

impl Default for RafflePolicy {
    fn default() -> Self {
        Self {
            ticket_rate: TICKET_RATE,
            prize_value: PRIZE_VALUE,
        }
    }
}

/// Full runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RaffleConfig {
    /// Path of the JSON ledger record.
    pub data_file: PathBuf,
    /// Contributed value per ticket.
    pub ticket_rate: u64,
    /// Announced prize amount.
    pub prize_value: u64,
    /// When set, commands are only accepted from this channel.
    pub raffle_channel_id: Option<String>,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            ticket_rate: TICKET_RATE,
            prize_value: PRIZE_VALUE,
            raffle_channel_id: None,
        }
    }
}

impl RaffleConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the document does not parse or a policy
    /// value is zero.
    pub fn from_toml_str(source: &str) -> RaffleResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| RaffleError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> RaffleResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| RaffleError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Applies `RAFFLE_DATA_FILE` / `RAFFLE_CHANNEL_ID` from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup. Empty values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty(ENV_DATA_FILE) {
            self.data_file = PathBuf::from(path);
        }
        if let Some(channel) = non_empty(ENV_CHANNEL_ID) {
            self.raffle_channel_id = Some(channel.trim().to_string());
        }
        self
    }

    /// Checks the policy values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `ticket_rate` or `prize_value` is zero.
    pub fn validate(&self) -> RaffleResult<()> {
        if self.ticket_rate == 0 {
            return Err(RaffleError::InvalidConfig(
                "ticket_rate must be greater than zero".to_string(),
            ));
        }
        if self.prize_value == 0 {
            return Err(RaffleError::InvalidConfig(
                "prize_value must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The policy part of the configuration.
    #[must_use]
    pub const fn policy(&self) -> RafflePolicy {
        RafflePolicy {
            ticket_rate: self.ticket_rate,
            prize_value: self.prize_value,
        }
    }
}
