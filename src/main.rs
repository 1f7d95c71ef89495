//! ChaCha20 UART Verifier
//!
//! Hardware check for an FPGA ChaCha20 core. The bitstream streams one
//! 64-byte keystream block over its UART; this tool captures it and
//! compares it against the RFC 8439 §2.3.2 test vector.
//!
//! # Usage
//!
//! ```bash
//! # Run the check on the default port (COM5 / /dev/ttyUSB0) at 115200 baud
//! chacha20-uart-verify
//!
//! # Run against a specific port with a longer read window
//! chacha20-uart-verify check -p /dev/ttyUSB1 -t 5000
//!
//! # Load settings from a TOML file
//! chacha20-uart-verify check -c fpga.toml
//!
//! # List available serial ports
//! chacha20-uart-verify ports
//!
//! # Print the expected keystream
//! chacha20-uart-verify vector
//! ```

mod config;
mod error;
mod keystream;
mod serial;
mod verify;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use config::{CheckConfig, FileConfig, Overrides};
use keystream::KEYSTREAM_LEN;
use serial::SerialConnection;
use verify::Comparison;

/// ChaCha20 UART Verifier
///
/// Compares the keystream emitted by an FPGA with the RFC 8439 test vector
#[derive(Parser)]
#[command(name = "chacha20-uart-verify")]
#[command(author = "Prasanna Gautam")]
#[command(version = "0.1.0")]
#[command(about = "Checks an FPGA ChaCha20 keystream over UART against RFC 8439")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    check: CheckArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the keystream from the FPGA and compare (default)
    Check(CheckArgs),

    /// List available serial ports
    Ports,

    /// Print the expected keystream as hex
    Vector,
}

#[derive(Args, Clone, Default)]
struct CheckArgs {
    /// Serial port path (e.g., /dev/ttyUSB0, COM5)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Read window in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Expected keystream as hex (64 bytes)
    #[arg(long)]
    expected: Option<String>,
}

impl CheckArgs {
    fn resolve(self) -> Result<CheckConfig> {
        let file = match self.config {
            Some(ref path) => {
                log::info!("loading config from {}", path.display());
                Some(FileConfig::load(path)?)
            }
            None => None,
        };

        let overrides = Overrides {
            port: self.port,
            baud_rate: self.baud,
            timeout_ms: self.timeout_ms,
            expected: self.expected,
        };

        Ok(CheckConfig::resolve(file, overrides)?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Some(Commands::Check(args)) => handle_check(args, cli.verbose),
        None => handle_check(cli.check, cli.verbose),
        Some(Commands::Ports) => Ok(serial::port::print_ports()?),
        Some(Commands::Vector) => {
            println!("{}", keystream::to_hex(&keystream::EXPECTED_KEYSTREAM));
            Ok(())
        }
    }
}

fn handle_check(args: CheckArgs, verbose: bool) -> Result<()> {
    let config = args.resolve()?;

    if !config.uses_rfc_vector() {
        log::warn!("using a custom expected vector instead of RFC 8439");
    }

    println!(
        "{} Reading {} bytes from {} at {} baud",
        "[*]".cyan().bold(),
        KEYSTREAM_LEN,
        config.port.port_path.white(),
        config.port.baud_rate
    );

    let received = capture(&config)?;
    let comparison = verify::compare(&received, &config.expected);

    verify::print_report(&received, &config.expected, &comparison, verbose)
        .context("Failed to write report")?;

    std::process::exit(exit_code(&comparison));
}

/// Open the port, read one window, and release the port before returning
fn capture(config: &CheckConfig) -> Result<Vec<u8>> {
    let mut conn = SerialConnection::open(config.port.clone())?;
    let received = conn
        .read_keystream(KEYSTREAM_LEN)
        .with_context(|| format!("Failed to read keystream from {}", conn.config().port_path))?;

    if received.len() < KEYSTREAM_LEN {
        log::warn!(
            "read window elapsed after {} of {} bytes",
            received.len(),
            KEYSTREAM_LEN
        );
    }

    Ok(received)
}

fn exit_code(comparison: &Comparison) -> i32 {
    if comparison.passed() {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystream::EXPECTED_KEYSTREAM;
    use serial::port::{read_window, TimedRead, DEFAULT_TIMEOUT};
    use std::io::{self, Cursor, Read};
    use std::time::Duration;

    /// Delivers a prefix of its data, then times out like an idle UART
    struct StalledUart {
        data: Cursor<Vec<u8>>,
    }

    impl Read for StalledUart {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::TimedOut, "Operation timed out")),
                n => Ok(n),
            }
        }
    }

    impl TimedRead for StalledUart {
        fn set_read_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(reader: &mut dyn TimedRead) -> Comparison {
        let received = read_window(reader, KEYSTREAM_LEN, DEFAULT_TIMEOUT).unwrap();
        verify::compare(&received, &EXPECTED_KEYSTREAM)
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_uses_top_level_args() {
        let cli = Cli::try_parse_from(["chacha20-uart-verify", "-p", "/dev/ttyUSB1", "-b", "9600"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.check.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(cli.check.baud, Some(9600));
    }

    #[test]
    fn test_check_subcommand_args() {
        let cli = Cli::try_parse_from(["chacha20-uart-verify", "check", "-t", "5000", "-v"]).unwrap();
        match cli.command {
            Some(Commands::Check(args)) => assert_eq!(args.timeout_ms, Some(5000)),
            _ => panic!("expected check subcommand"),
        }
        assert!(cli.verbose);
    }

    #[test]
    fn test_args_resolve_into_config() {
        let args = CheckArgs {
            port: Some("COM7".into()),
            timeout_ms: Some(250),
            ..Default::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.port.port_path, "COM7");
        assert_eq!(config.port.timeout, std::time::Duration::from_millis(250));
    }

    #[test]
    fn test_uart_sending_rfc_vector_passes() {
        let mut uart = StalledUart {
            data: Cursor::new(EXPECTED_KEYSTREAM.to_vec()),
        };
        let comparison = run(&mut uart);
        assert!(comparison.passed());
        assert_eq!(exit_code(&comparison), 0);
    }

    #[test]
    fn test_uart_sending_zeros_fails() {
        let mut uart = StalledUart {
            data: Cursor::new(vec![0u8; 64]),
        };
        let comparison = run(&mut uart);
        assert!(!comparison.passed());
        assert_eq!(exit_code(&comparison), 1);
    }

    #[test]
    fn test_uart_stalling_after_half_block_fails() {
        let mut uart = StalledUart {
            data: Cursor::new(EXPECTED_KEYSTREAM[..32].to_vec()),
        };
        let comparison = run(&mut uart);
        assert!(!comparison.passed());
        assert!(comparison.is_short_read());
        assert_eq!(comparison.received_len, 32);
    }

    #[test]
    fn test_only_first_block_is_consumed() {
        let mut stream = EXPECTED_KEYSTREAM.to_vec();
        stream.extend_from_slice(&[0xee; 16]);
        let mut uart = StalledUart {
            data: Cursor::new(stream),
        };
        assert!(run(&mut uart).passed());
    }
}
