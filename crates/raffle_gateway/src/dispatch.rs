//! # Dispatch
//!
//! Validates the caller, runs the command against the [`RaffleContext`] and
//! renders the reply. Every outcome, including failures, becomes a [`Reply`];
//! nothing here ends the process.

use rand::rngs::StdRng;
use rand::Rng;
use raffle_ledger::{LedgerStore, RaffleError};

use crate::command::Command;
use crate::context::RaffleContext;
use crate::error::{GatewayError, GatewayResult};
use crate::reply::{self, Reply};

/// Who sent a command, as the platform reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    /// Platform user id of the sender.
    pub user_id: String,
    /// Sender holds the administrator permission in the server.
    pub is_administrator: bool,
    /// Channel the command was sent from.
    pub channel_id: Option<String>,
    /// Command was sent from inside a server rather than a direct message.
    pub in_guild: bool,
}

impl Caller {
    /// A server administrator in the given channel.
    #[must_use]
    pub fn administrator(user_id: impl Into<String>, channel_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_administrator: true,
            channel_id,
            in_guild: true,
        }
    }
}

/// Command handler over one context.
pub struct RaffleGateway<S, R = StdRng> {
    context: RaffleContext<S, R>,
}

impl<S: LedgerStore, R: Rng> RaffleGateway<S, R> {
    /// Wraps a context built at startup.
    #[must_use]
    pub fn new(context: RaffleContext<S, R>) -> Self {
        Self { context }
    }

    /// The wrapped context.
    #[must_use]
    pub fn context(&self) -> &RaffleContext<S, R> {
        &self.context
    }

    /// Checks the caller in order: administrator, raffle channel, inside a server.
    ///
    /// # Errors
    ///
    /// The first check that fails.
    pub fn validate(&self, caller: &Caller) -> GatewayResult<()> {
        if !caller.is_administrator {
            return Err(GatewayError::NotAdministrator);
        }
        if let Some(required) = self.context.raffle_channel_id() {
            if caller.channel_id.as_deref() != Some(required) {
                return Err(GatewayError::WrongChannel);
            }
        }
        if !caller.in_guild {
            return Err(GatewayError::OutsideGuild);
        }
        Ok(())
    }

    /// Parses and handles one console line.
    pub fn handle_line(&self, caller: &Caller, line: &str) -> Reply {
        match Command::parse(line) {
            Ok(command) => self.handle(caller, &command),
            Err(err) => reply::failure(&err, self.context.policy()),
        }
    }

    /// Handles one command.
    pub fn handle(&self, caller: &Caller, command: &Command) -> Reply {
        match self.validate(caller).and_then(|()| self.execute(command)) {
            Ok(reply) => reply,
            Err(err) => {
                self.log_failure(caller, command, &err);
                reply::failure(&err, self.context.policy())
            }
        }
    }

    fn execute(&self, command: &Command) -> GatewayResult<Reply> {
        let reply = match command {
            Command::Add { member, value } => {
                let receipt = self.context.grant(&member.id, &member.display_name, *value)?;
                reply::granted(&member.id, &receipt)
            }
            Command::Status { id } => reply::status(id, self.context.status(id)?.as_ref()),
            Command::List => reply::list(&self.context.list()?),
            Command::Draw => reply::winner(&self.context.draw()?, self.context.policy()),
            Command::Reset => {
                self.context.reset()?;
                reply::reset()
            }
            Command::Help => reply::help(),
        };
        Ok(reply)
    }

    fn log_failure(&self, caller: &Caller, command: &Command, err: &GatewayError) {
        match err {
            GatewayError::Raffle(raffle) if raffle.is_storage_fault() => {
                tracing::error!(
                    "{} by {} failed on ledger storage: {}",
                    command.name(),
                    caller.user_id,
                    raffle
                );
            }
            GatewayError::Raffle(RaffleError::EmptyPool) => {
                tracing::info!("{} by {}: {}", command.name(), caller.user_id, err);
            }
            _ => {
                tracing::warn!("{} by {} rejected: {}", command.name(), caller.user_id, err);
            }
        }
    }

    /// Tears the gateway down and hands back the store.
    pub fn shutdown(self) -> S {
        self.context.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use raffle_ledger::{MemoryStore, RaffleConfig};

    const CHANNEL: &str = "raffle-room";

    fn gateway(channel: Option<&str>) -> RaffleGateway<MemoryStore, ChaCha8Rng> {
        let config = RaffleConfig {
            raffle_channel_id: channel.map(str::to_string),
            ..RaffleConfig::default()
        };
        let context =
            RaffleContext::new(&config, MemoryStore::new(), ChaCha8Rng::seed_from_u64(11)).unwrap();
        RaffleGateway::new(context)
    }

    fn admin() -> Caller {
        Caller::administrator("op", Some(CHANNEL.to_string()))
    }

    #[test]
    fn test_validation_order() {
        let gw = gateway(Some(CHANNEL));

        let mut caller = Caller {
            user_id: "x".to_string(),
            is_administrator: false,
            channel_id: Some("elsewhere".to_string()),
            in_guild: false,
        };
        assert_eq!(gw.validate(&caller), Err(GatewayError::NotAdministrator));

        caller.is_administrator = true;
        assert_eq!(gw.validate(&caller), Err(GatewayError::WrongChannel));

        caller.channel_id = Some(CHANNEL.to_string());
        assert_eq!(gw.validate(&caller), Err(GatewayError::OutsideGuild));

        caller.in_guild = true;
        assert_eq!(gw.validate(&caller), Ok(()));
    }

    #[test]
    fn test_any_channel_without_restriction() {
        let gw = gateway(None);
        let caller = Caller::administrator("op", None);
        assert_eq!(gw.validate(&caller), Ok(()));
    }

    #[test]
    fn test_denied_caller_never_touches_ledger() {
        let gw = gateway(Some(CHANNEL));
        let caller = Caller {
            is_administrator: false,
            ..admin()
        };

        let reply = gw.handle_line(&caller, "add 1 50000 Ana");

        assert!(reply.ephemeral);
        assert!(reply.text.contains("permission"));
        assert!(gw.shutdown().record().is_none());
    }

    #[test]
    fn test_add_then_status() {
        let gw = gateway(Some(CHANNEL));

        let reply = gw.handle_line(&admin(), "add 1001 12000 Ana");
        assert!(!reply.ephemeral);
        assert_eq!(
            reply.text,
            "✅ <@1001> received **2 ticket(s)**. Current total: **2 ticket(s)** (12.000 contributed)."
        );

        let reply = gw.handle_line(&admin(), "status 1001");
        assert_eq!(reply.text, "📌 <@1001>: 2 ticket(s), 12.000 contributed.");

        let reply = gw.handle_line(&admin(), "status 2002");
        assert_eq!(reply.text, "<@2002> has no tickets yet.");
    }

    #[test]
    fn test_rejections_are_ephemeral() {
        let gw = gateway(None);
        let caller = Caller::administrator("op", None);

        for line in ["add 1 0 Ana", "add 1 4999 Ana", "add 1", "bogus", "help"] {
            assert!(gw.handle_line(&caller, line).ephemeral, "{line}");
        }
        assert!(gw.shutdown().record().is_none());
    }

    #[test]
    fn test_draw_and_reset() {
        let gw = gateway(None);
        let caller = Caller::administrator("op", None);

        let reply = gw.handle_line(&caller, "draw");
        assert_eq!(reply, Reply::public("There are no tickets to draw from."));

        gw.handle_line(&caller, "add 77 5000 Solo");
        let reply = gw.handle_line(&caller, "draw");
        assert!(reply.text.contains("Winner: <@77>"));
        assert!(reply.text.contains("Prize: **10.000**"));

        let reply = gw.handle_line(&caller, "reset");
        assert!(reply.text.starts_with("♻️"));
        assert_eq!(
            gw.handle_line(&caller, "list").text,
            "No participants registered yet."
        );
    }

    #[test]
    fn test_storage_fault_reply() {
        let gw = gateway(None);
        let caller = Caller::administrator("op", None);
        gw.handle_line(&caller, "add 1 5000 Ana");

        let store = gw.shutdown();
        store.set_available(false);
        let context = RaffleContext::new(
            &RaffleConfig::default(),
            store,
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap();
        let gw = RaffleGateway::new(context);

        let reply = gw.handle_line(&caller, "list");
        assert!(reply.ephemeral);
        assert!(reply.text.contains("unavailable"));
    }

    #[test]
    fn test_array_shaped_record_is_reported_damaged() {
        let record = r#"[{"1": {"display_name": "A", "total_contributed": 5000, "ticket_count": 1}}]"#;
        let context = RaffleContext::new(
            &RaffleConfig::default(),
            MemoryStore::with_record(record),
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap();
        let gw = RaffleGateway::new(context);
        let caller = Caller::administrator("op", None);

        for line in ["list", "draw", "add 2 5000 Bia"] {
            let reply = gw.handle_line(&caller, line);
            assert!(reply.ephemeral, "{line}");
            assert!(reply.text.contains("damaged"), "{line}: {}", reply.text);
        }
        assert_eq!(gw.shutdown().record().as_deref(), Some(record.as_bytes()));
    }
}
