// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// Error types for the recoverable edges of the engine. Everything else
// (protocol violations, out-of-range qids, mid-session L1 I/O errors) is
// fatal by design (spec §7) and goes through `fatal!`, not a `Result`.

use std::fmt;
use std::io;

/// Failure to bring the engine up.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("failed to connect to L1 peer at {host}:{port} after {attempts} attempts: {source}")]
    ConnectFailed { host: String, port: u16, attempts: u32, source: io::Error },
}

/// `enqueue` could not accept the item because the queue is at capacity.
/// Not an error in the exceptional sense — callers are expected to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full;

impl fmt::Display for Full {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue full")
    }
}

impl std::error::Error for Full {}

/// `pop` found no item waiting. Callers are expected to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Empty;

impl fmt::Display for Empty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue empty")
    }
}

impl std::error::Error for Empty {}

/// Abort the process after logging a diagnostic. Used for every failure
/// mode spec.md §7 marks fatal: L1 I/O errors mid-session, protocol
/// violations, out-of-range application qids, and internal corruption
/// (a poisoned queue mutex).
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
        eprintln!("vfpga-link: fatal: {}", format_args!($($arg)*));
        std::process::abort()
    }};
}
