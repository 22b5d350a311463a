//! Process-wide console state
//!
//! One [`ConsoleContext`] lives in a static for the whole process. It holds
//! the global lock flag, the last rendered progress state and the terminal
//! size cache. Everything here is meant to be driven by a single owner at a
//! time; the atomics and the mutex exist so the static is `Sync`, and so the
//! resize handler can clear the size cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use super::metrics::TerminalMetrics;
use super::sys;

static GLOBAL: ConsoleContext = ConsoleContext::new();

/// Last text/percent pair written by the progress renderer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    text: Option<String>,
    percent: Option<u8>,
}

impl ProgressState {
    pub const fn new() -> Self {
        Self {
            text: None,
            percent: None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn percent(&self) -> Option<u8> {
        self.percent
    }

    /// Whether `(text, percent)` is what was last rendered
    pub fn matches(&self, text: Option<&str>, percent: Option<u8>) -> bool {
        self.percent == percent && self.text.as_deref() == text
    }

    pub fn record(&mut self, text: Option<&str>, percent: Option<u8>) {
        match (text, &mut self.text) {
            (Some(new), Some(buf)) => {
                buf.clear();
                buf.push_str(new);
            }
            (new, slot) => *slot = new.map(str::to_owned),
        }
        self.percent = percent;
    }

    /// State right after a lock: percent 0, no text
    pub fn begin(&mut self) {
        self.percent = Some(0);
    }

    pub fn reset(&mut self) {
        self.text = None;
        self.percent = None;
    }
}

/// Process-scoped console state
#[derive(Debug)]
pub struct ConsoleContext {
    locked: AtomicBool,
    tty: OnceLock<bool>,
    progress: Mutex<ProgressState>,
    metrics: TerminalMetrics,
}

impl Default for ConsoleContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleContext {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            tty: OnceLock::new(),
            progress: Mutex::new(ProgressState::new()),
            metrics: TerminalMetrics::new(),
        }
    }

    /// A context whose tty-ness is fixed up front instead of queried
    pub fn with_tty(is_tty: bool) -> Self {
        let ctx = Self::new();
        let _ = ctx.tty.set(is_tty);
        ctx
    }

    /// The context backing the process's standard output
    pub fn global() -> &'static ConsoleContext {
        &GLOBAL
    }

    /// Whether output goes to a terminal. Determined once, then cached.
    pub fn is_tty(&self) -> bool {
        *self.tty.get_or_init(sys::stdout_is_tty)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> &TerminalMetrics {
        &self.metrics
    }

    pub fn progress(&self) -> MutexGuard<'_, ProgressState> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the global lock flag. Returns false if it was already held.
    pub(crate) fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_state_matches() {
        let mut state = ProgressState::new();
        assert!(state.matches(None, None));

        state.begin();
        assert!(state.matches(None, Some(0)));
        assert!(!state.matches(Some("x"), Some(0)));

        state.record(Some("Fetching"), Some(10));
        assert!(state.matches(Some("Fetching"), Some(10)));
        assert!(!state.matches(Some("Fetching"), Some(11)));

        state.record(Some("Unpacking"), Some(10));
        assert_eq!(state.text(), Some("Unpacking"));

        state.record(None, Some(20));
        assert_eq!(state.text(), None);
        assert_eq!(state.percent(), Some(20));

        state.reset();
        assert_eq!(state, ProgressState::new());
    }

    #[test]
    fn test_lock_flag() {
        let ctx = ConsoleContext::new();
        assert!(!ctx.is_locked());
        assert!(ctx.try_acquire());
        assert!(!ctx.try_acquire());
        assert!(ctx.is_locked());
        ctx.release();
        assert!(!ctx.is_locked());
    }

    #[test]
    fn test_with_tty_is_fixed() {
        assert!(ConsoleContext::with_tty(true).is_tty());
        assert!(!ConsoleContext::with_tty(false).is_tty());
    }
}
