//! # Raffle Console
//!
//! Operator console for the raffle ledger. Reads one command per line from
//! stdin and prints each reply to stdout; logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! raffle_console --config raffle.toml
//! echo "add 1001 12000 Ana" | raffle_console --data-file /tmp/raffle.json
//! RUST_LOG=debug raffle_console
//! ```

use raffle_gateway::{Caller, RaffleContext, RaffleGateway};
use raffle_ledger::RaffleConfig;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command-line options.
#[derive(Default)]
struct Options {
    config: Option<PathBuf>,
    data_file: Option<PathBuf>,
    channel: Option<String>,
}

fn print_usage() {
    println!("Usage: raffle_console [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>      TOML configuration file");
    println!("  -d, --data-file <PATH>   Ledger record (default: raffle_data.json)");
    println!("      --channel <ID>       Only accept commands for this raffle channel");
    println!("  -h, --help               Show this help");
    println!();
    println!("Environment: RAFFLE_DATA_FILE, RAFFLE_CHANNEL_ID, RUST_LOG");
}

/// Parses arguments (simple parsing, no external deps).
///
/// Returns `None` when the process should exit after printing help.
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut i = 1;
    while i < args.len() {
        let value = || {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "--config" | "-c" => {
                options.config = Some(PathBuf::from(value()?));
                i += 1;
            }
            "--data-file" | "-d" => {
                options.data_file = Some(PathBuf::from(value()?));
                i += 1;
            }
            "--channel" => {
                options.channel = Some(value()?);
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(Some(options))
}

/// File, then environment, then command line.
fn load_config(options: &Options) -> Result<RaffleConfig, String> {
    let config = match &options.config {
        Some(path) => RaffleConfig::from_file(path).map_err(|e| e.to_string())?,
        None => RaffleConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(path) = &options.data_file {
        config.data_file = path.clone();
    }
    if let Some(channel) = &options.channel {
        config.raffle_channel_id = Some(channel.clone());
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            print_usage();
            std::process::exit(2);
        }
    };

    let config = match load_config(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let context = match RaffleContext::from_config(&config) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let gateway = RaffleGateway::new(context);

    // The console operator is trusted and speaks from the raffle channel.
    let operator = Caller::administrator("console", config.raffle_channel_id.clone());

    eprintln!("Raffle console ready. Type `help` for commands, `quit` to exit.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let reply = gateway.handle_line(&operator, line);
        let written = if reply.ephemeral {
            writeln!(stdout, "(only you) {}", reply.text)
        } else {
            writeln!(stdout, "{}", reply.text)
        };
        if written.and_then(|()| stdout.flush()).is_err() {
            break;
        }
    }

    let _store = gateway.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("raffle_console")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&["-d", "/tmp/l.json", "--channel", "42"]))
            .unwrap()
            .unwrap();
        assert_eq!(options.data_file, Some(PathBuf::from("/tmp/l.json")));
        assert_eq!(options.channel.as_deref(), Some("42"));
        assert!(options.config.is_none());
    }

    #[test]
    fn test_parse_args_help_and_errors() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
        assert!(parse_args(&args(&["--config"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_command_line_wins() {
        let options = Options {
            config: None,
            data_file: Some(PathBuf::from("cli.json")),
            channel: Some("cli-channel".to_string()),
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.data_file, PathBuf::from("cli.json"));
        assert_eq!(config.raffle_channel_id.as_deref(), Some("cli-channel"));
    }
}
