//! Console ownership and terminal state.
//!
//! - **context**: the process-wide [`ConsoleContext`] (lock flag, progress
//!   state, size cache)
//! - **metrics**: lazily cached terminal width/height
//! - **session**: lock/unlock lifecycle for console output
//! - **sys**: window-size ioctl, tty detection, EINTR retry
//!
//! # Architecture
//!
//! ```text
//! ConsoleContext (static)
//! ├── locked flag        <- ConsoleSession::lock / unlock
//! ├── ProgressState      <- ui::progress
//! └── TerminalMetrics    <- SIGWINCH handler clears it
//! ```

pub mod context;
pub mod metrics;
pub mod session;
pub mod sys;

pub use context::{ConsoleContext, ProgressState};
pub use metrics::{columns, lines, TerminalMetrics};
pub use session::{ConsoleGuard, ConsoleSession};
pub use sys::WindowSize;
