//! termprogress - console ownership and progress bars for command-line tools
//!
//! termprogress lets a long-running command own standard output while it
//! reports progress, draws a single-line ASCII bar that redraws in place,
//! and sets terminal colors that are reset again even if the process is
//! killed by a signal halfway through.
//!
//! # Features
//!
//! - **Console lock**: one [`ConsoleSession`] owns the console at a time
//! - **Progress bar**: full-width, flicker-free, plain lines when piped
//! - **Colors**: a fixed ANSI subset for foreground and background
//! - **Signal safety**: SIGINT, SIGTERM and friends restore default colors
//! - **Resize aware**: SIGWINCH invalidates the cached terminal width
//!
//! # Usage
//!
//! ```no_run
//! use termprogress::{install_signal_handlers, render_progress, ConsoleSession};
//!
//! # fn main() -> anyhow::Result<()> {
//! install_signal_handlers()?;
//! let mut console = ConsoleSession::new();
//! console.lock()?;
//! for i in 0..=100 {
//!     render_progress(Some("Fetching"), i)?;
//! }
//! console.unlock()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod signal;
pub mod ui;

pub use crate::config::Config;
pub use crate::core::{columns, lines, ConsoleContext, ConsoleGuard, ConsoleSession, TerminalMetrics, WindowSize};
pub use crate::error::{ConsoleError, Result};
pub use crate::signal::install_signal_handlers;
pub use crate::ui::{render_progress, render_text, reset_color, set_color, Color, ColorStyle};
