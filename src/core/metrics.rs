//! Terminal size cache
//!
//! Columns and lines are queried lazily from the standard-output descriptor
//! and cached until a resize notification clears them. The cache is plain
//! atomics so the SIGWINCH handler can invalidate it without allocating or
//! locking.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use super::context::ConsoleContext;
use super::sys::{self, WindowSize};

/// Columns used when the terminal size is unavailable
pub const DEFAULT_COLUMNS: u16 = 80;
/// Lines used when the terminal size is unavailable
pub const DEFAULT_LINES: u16 = 24;
/// Upper bound on reported columns
pub const MAX_COLUMNS: u16 = 256;

/// Cached terminal dimensions. Zero means "needs recompute".
#[derive(Debug)]
pub struct TerminalMetrics {
    columns: AtomicU32,
    lines: AtomicU32,
}

impl Default for TerminalMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalMetrics {
    pub const fn new() -> Self {
        Self {
            columns: AtomicU32::new(0),
            lines: AtomicU32::new(0),
        }
    }

    /// Number of columns for terminal output
    pub fn columns(&self) -> u16 {
        self.columns_with(sys::stdout_window_size)
    }

    /// Number of lines for terminal output
    pub fn lines(&self) -> u16 {
        self.lines_with(sys::stdout_window_size)
    }

    /// Like [`columns`](Self::columns), but with a caller-supplied size probe
    /// that is only consulted on a cache miss.
    pub fn columns_with<F>(&self, probe: F) -> u16
    where
        F: FnOnce() -> io::Result<WindowSize>,
    {
        if let Some(columns) = self.cached_columns() {
            return columns;
        }

        let columns = match probe() {
            Ok(ws) if ws.columns > 0 => ws.columns.min(MAX_COLUMNS),
            Ok(_) => DEFAULT_COLUMNS,
            Err(e) => {
                debug!("Terminal width unavailable, using {}: {}", DEFAULT_COLUMNS, e);
                DEFAULT_COLUMNS
            }
        };
        self.columns.store(u32::from(columns), Ordering::Relaxed);
        columns
    }

    /// Like [`lines`](Self::lines), but with a caller-supplied size probe.
    pub fn lines_with<F>(&self, probe: F) -> u16
    where
        F: FnOnce() -> io::Result<WindowSize>,
    {
        if let Some(lines) = self.cached_lines() {
            return lines;
        }

        let lines = match probe() {
            Ok(ws) if ws.lines > 0 => ws.lines,
            Ok(_) => DEFAULT_LINES,
            Err(e) => {
                debug!("Terminal height unavailable, using {}: {}", DEFAULT_LINES, e);
                DEFAULT_LINES
            }
        };
        self.lines.store(u32::from(lines), Ordering::Relaxed);
        lines
    }

    pub fn cached_columns(&self) -> Option<u16> {
        match self.columns.load(Ordering::Relaxed) {
            0 => None,
            c => Some(c as u16),
        }
    }

    pub fn cached_lines(&self) -> Option<u16> {
        match self.lines.load(Ordering::Relaxed) {
            0 => None,
            l => Some(l as u16),
        }
    }

    /// Forget both cached values.
    ///
    /// Async-signal-safe: two atomic stores and nothing else.
    pub fn invalidate(&self) {
        self.columns.store(0, Ordering::Relaxed);
        self.lines.store(0, Ordering::Relaxed);
    }
}

/// Columns of the process's terminal
pub fn columns() -> u16 {
    ConsoleContext::global().metrics().columns()
}

/// Lines of the process's terminal
pub fn lines() -> u16 {
    ConsoleContext::global().metrics().lines()
}
