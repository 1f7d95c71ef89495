//! Keystream comparison and operator report

use crate::keystream::to_hex;
use colored::Colorize;
use std::fmt;
use std::io::{self, Write};

/// Outcome shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "ChaCha20 FPGA PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Result of comparing a captured keystream with the reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub verdict: Verdict,
    pub received_len: usize,
    pub expected_len: usize,
    /// First offset where both buffers hold a byte and the bytes differ
    pub first_mismatch: Option<usize>,
}

impl Comparison {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Fewer bytes arrived than the reference holds
    pub fn is_short_read(&self) -> bool {
        self.received_len < self.expected_len
    }
}

/// Exact byte-sequence equality, length included
pub fn compare(received: &[u8], expected: &[u8]) -> Comparison {
    let first_mismatch = received
        .iter()
        .zip(expected)
        .position(|(rx, exp)| rx != exp);

    let verdict = if received == expected {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    Comparison {
        verdict,
        received_len: received.len(),
        expected_len: expected.len(),
        first_mismatch,
    }
}

/// Write the RX/EXP lines, the verdict, and diagnostics on failure
pub fn write_report<W: Write>(
    out: &mut W,
    received: &[u8],
    expected: &[u8],
    comparison: &Comparison,
    verbose: bool,
) -> io::Result<()> {
    writeln!(out, "RX: {}", to_hex(received))?;
    writeln!(out, "EXP: {}", to_hex(expected))?;

    if comparison.passed() {
        writeln!(out, "{}", comparison.verdict.to_string().green().bold())?;
        return Ok(());
    }

    writeln!(out, "{}", comparison.verdict.to_string().red().bold())?;

    if let Some(offset) = comparison.first_mismatch {
        writeln!(
            out,
            "  {} first mismatch at byte {} (rx {:02x}, exp {:02x})",
            "[*]".cyan().bold(),
            offset,
            received[offset],
            expected[offset]
        )?;
    }

    if comparison.is_short_read() {
        writeln!(
            out,
            "  {} short read: {} of {} bytes before timeout",
            "[WARNING]".yellow().bold(),
            comparison.received_len,
            comparison.expected_len
        )?;
    } else if comparison.received_len > comparison.expected_len {
        writeln!(
            out,
            "  {} received {} bytes, expected {}",
            "[WARNING]".yellow().bold(),
            comparison.received_len,
            comparison.expected_len
        )?;
    }

    if verbose && !received.is_empty() {
        writeln!(out, "\n{}", "Received bytes:".white().bold())?;
        for line in hexdump::hexdump_iter(received) {
            writeln!(out, "  {}", line)?;
        }
    }

    Ok(())
}

/// Print the report to stdout
pub fn print_report(received: &[u8], expected: &[u8], comparison: &Comparison, verbose: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, received, expected, comparison, verbose)
}
