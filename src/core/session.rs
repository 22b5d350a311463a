//! Console session management
//!
//! A [`ConsoleSession`] represents "this thread currently owns console
//! output". At most one session may be locked per [`ConsoleContext`];
//! locking twice or unlocking an unlocked session is a programming error
//! and panics.

use std::io::{self, Write};

use crossterm::cursor::SavePosition;
use crossterm::queue;
use tracing::{debug, warn};

use super::context::ConsoleContext;
use crate::signal;

/// Exclusive ownership of console output
#[derive(Debug, Default)]
pub struct ConsoleSession {
    locked: bool,
    is_tty: bool,
}

impl ConsoleSession {
    pub const fn new() -> Self {
        Self {
            locked: false,
            is_tty: false,
        }
    }

    /// Lock a new session on standard output, unlocking it when the guard
    /// is dropped.
    pub fn guard() -> io::Result<ConsoleGuard> {
        let mut session = Self::new();
        session.lock()?;
        Ok(ConsoleGuard { session })
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether output was going to a terminal when the session was locked
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Take ownership of standard output.
    ///
    /// # Panics
    ///
    /// If this session or any other session is already locked.
    pub fn lock(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.lock_in(ConsoleContext::global(), &mut out)
    }

    /// Release standard output.
    ///
    /// # Panics
    ///
    /// If the session is not locked.
    pub fn unlock(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.unlock_in(ConsoleContext::global(), &mut out)
    }

    /// Lock against an explicit context, writing to `out`.
    pub fn lock_in<W: Write>(&mut self, ctx: &ConsoleContext, out: &mut W) -> io::Result<()> {
        assert!(!self.locked, "console session is already locked");
        assert!(ctx.try_acquire(), "console is already locked by another session");

        self.is_tty = ctx.is_tty();
        self.locked = true;
        ctx.progress().begin();
        debug!("Console locked (tty: {})", self.is_tty);

        if self.is_tty {
            if let Err(e) = signal::ensure_resize_handler() {
                warn!("Terminal resize tracking disabled: {}", e);
            }

            // Start on a fresh line and remember where the bar goes
            out.write_all(b"\n")?;
            queue!(out, SavePosition)?;
            out.flush()?;
        }
        Ok(())
    }

    /// Unlock against an explicit context, writing to `out`.
    ///
    /// The lock is released even if the trailing newline cannot be written.
    pub fn unlock_in<W: Write>(&mut self, ctx: &ConsoleContext, out: &mut W) -> io::Result<()> {
        assert!(self.locked, "console session is not locked");
        assert!(ctx.is_locked(), "console is not locked");

        ctx.progress().reset();

        let result = if self.is_tty {
            out.write_all(b"\n").and_then(|()| out.flush())
        } else {
            Ok(())
        };

        ctx.release();
        self.locked = false;
        debug!("Console unlocked");
        result
    }
}

/// Scoped [`ConsoleSession`] on standard output
#[derive(Debug)]
pub struct ConsoleGuard {
    session: ConsoleSession,
}

impl ConsoleGuard {
    pub fn is_tty(&self) -> bool {
        self.session.is_tty()
    }

    /// Unlock now, reporting write errors that `Drop` would swallow.
    pub fn finish(mut self) -> io::Result<()> {
        self.session.unlock()
    }
}

impl Drop for ConsoleGuard {
    fn drop(&mut self) {
        if self.session.is_locked() {
            if let Err(e) = self.session.unlock() {
                warn!("Failed to release console: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_unlock_tty() {
        let ctx = ConsoleContext::with_tty(true);
        let mut session = ConsoleSession::new();
        let mut out = Vec::new();

        session.lock_in(&ctx, &mut out).unwrap();
        assert!(session.is_locked());
        assert!(session.is_tty());
        assert!(ctx.is_locked());
        assert_eq!(out, b"\n\x1b7");
        assert_eq!(ctx.progress().percent(), Some(0));

        ctx.progress().record(Some("Pulling"), Some(40));

        let mut out = Vec::new();
        session.unlock_in(&ctx, &mut out).unwrap();
        assert!(!session.is_locked());
        assert!(!ctx.is_locked());
        assert_eq!(out, b"\n");
        assert_eq!(ctx.progress().text(), None);
        assert_eq!(ctx.progress().percent(), None);
    }

    #[test]
    fn test_lock_unlock_not_tty() {
        let ctx = ConsoleContext::with_tty(false);
        let mut session = ConsoleSession::new();
        let mut out = Vec::new();

        session.lock_in(&ctx, &mut out).unwrap();
        assert!(!session.is_tty());
        session.unlock_in(&ctx, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_relock_after_unlock() {
        let ctx = ConsoleContext::with_tty(false);
        let mut session = ConsoleSession::new();
        let mut sink = io::sink();

        session.lock_in(&ctx, &mut sink).unwrap();
        session.unlock_in(&ctx, &mut sink).unwrap();
        session.lock_in(&ctx, &mut sink).unwrap();
        assert!(ctx.is_locked());
    }

    #[test]
    #[should_panic(expected = "already locked")]
    fn test_double_lock_rejected() {
        let ctx = ConsoleContext::with_tty(false);
        let mut session = ConsoleSession::new();
        let mut sink = io::sink();

        session.lock_in(&ctx, &mut sink).unwrap();
        session.lock_in(&ctx, &mut sink).unwrap();
    }

    #[test]
    #[should_panic(expected = "locked by another session")]
    fn test_second_session_rejected() {
        let ctx = ConsoleContext::with_tty(false);
        let mut sink = io::sink();

        let mut first = ConsoleSession::new();
        first.lock_in(&ctx, &mut sink).unwrap();

        let mut second = ConsoleSession::new();
        second.lock_in(&ctx, &mut sink).unwrap();
    }

    #[test]
    #[should_panic(expected = "not locked")]
    fn test_unlock_without_lock_rejected() {
        let ctx = ConsoleContext::with_tty(false);
        let mut session = ConsoleSession::new();
        session.unlock_in(&ctx, &mut io::sink()).unwrap();
    }
}
