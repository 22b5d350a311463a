//! Signal handlers that keep the terminal usable.
//!
//! [`install_signal_handlers`] hooks the terminating and job-control
//! signals so that a colored run interrupted by Ctrl+C, a broken pipe or a
//! timeout still leaves the terminal with default colors. Each handler
//! resets colors through [`safe`], restores the default disposition and
//! re-raises, so the process still dies (or stops, or dumps core) exactly
//! as it would have.
//!
//! The SIGWINCH handler only clears the terminal size cache.

#[cfg(unix)]
pub mod safe;

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether stdout was a terminal when the handlers were installed. Read
/// from signal context, where a live tty query is not safe.
static TTY_AT_INSTALL: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
pub(crate) fn tty_snapshot() -> bool {
    TTY_AT_INSTALL.load(Ordering::Relaxed)
}

#[cfg(unix)]
mod unix {
    use std::io;
    use std::os::raw::c_int;
    use std::ptr;
    use std::sync::atomic::Ordering;
    use std::sync::OnceLock;

    use tracing::{debug, info};

    use super::{safe, TTY_AT_INSTALL};
    use crate::core::sys::retry_eintr;
    use crate::core::ConsoleContext;
    use crate::error::{ConsoleError, Result};

    /// Signals whose default action would leave colors set
    pub const COLOR_RESET_SIGNALS: &[c_int] = &[
        libc::SIGTSTP,
        libc::SIGALRM,
        libc::SIGHUP,
        libc::SIGINT,
        libc::SIGPIPE,
        libc::SIGQUIT,
        libc::SIGTERM,
        #[cfg(any(
            target_os = "linux",
            target_os = "android",
            target_os = "solaris",
            target_os = "illumos"
        ))]
        libc::SIGPOLL,
        libc::SIGPROF,
        libc::SIGVTALRM,
        libc::SIGXCPU,
        libc::SIGXFSZ,
    ];

    static RESIZE_HANDLER: OnceLock<std::result::Result<(), i32>> = OnceLock::new();

    extern "C" fn on_color_signal(sig: c_int) {
        safe::reset_color();
        // SAFETY: signal(2) and raise(3) are async-signal-safe.
        unsafe {
            libc::signal(sig, libc::SIG_DFL);
            libc::raise(sig);
        }
    }

    extern "C" fn on_resize(_: c_int) {
        ConsoleContext::global().metrics().invalidate();
    }

    fn install_error(signal: c_int, errno: crate::core::sys::Errno) -> ConsoleError {
        ConsoleError::SignalInstall {
            signal,
            source: io::Error::from(errno),
        }
    }

    pub fn install_signal_handlers() -> Result<()> {
        let is_tty = ConsoleContext::global().is_tty();
        TTY_AT_INSTALL.store(is_tty, Ordering::Relaxed);

        let installed = install_color_reset(COLOR_RESET_SIGNALS)?;
        info!("Color reset handlers installed for {} signals (tty: {})", installed, is_tty);
        Ok(())
    }

    /// Point each signal in `signals` at the color-reset handler, skipping
    /// signals that are currently ignored. Returns how many were hooked.
    pub(crate) fn install_color_reset(signals: &[c_int]) -> Result<usize> {
        let mut installed = 0;
        for &sig in signals {
            // SAFETY: sigaction is plain old data; all-zero is a valid value.
            let mut act: libc::sigaction = unsafe { std::mem::zeroed() };
            // SAFETY: a query only writes into `act`.
            retry_eintr(|| unsafe { libc::sigaction(sig, ptr::null(), &mut act) })
                .map_err(|e| install_error(sig, e))?;

            if act.sa_sigaction == libc::SIG_IGN {
                debug!("Signal {} is ignored, leaving it alone", sig);
                continue;
            }

            act.sa_sigaction = on_color_signal as extern "C" fn(c_int) as libc::sighandler_t;
            act.sa_flags &= !libc::SA_SIGINFO;
            // SAFETY: on_color_signal only calls async-signal-safe functions.
            retry_eintr(|| unsafe { libc::sigaction(sig, &act, ptr::null_mut()) })
                .map_err(|e| install_error(sig, e))?;
            installed += 1;
        }
        Ok(installed)
    }

    /// Install the SIGWINCH cache-invalidation handler once per process.
    pub fn ensure_resize_handler() -> Result<()> {
        let outcome = RESIZE_HANDLER.get_or_init(|| {
            let handler = on_resize as extern "C" fn(c_int) as libc::sighandler_t;
            // SAFETY: on_resize only performs atomic stores.
            if unsafe { libc::signal(libc::SIGWINCH, handler) } == libc::SIG_ERR {
                Err(io::Error::last_os_error().raw_os_error().unwrap_or(0))
            } else {
                debug!("SIGWINCH handler installed");
                Ok(())
            }
        });
        outcome.map_err(|errno| ConsoleError::SignalInstall {
            signal: libc::SIGWINCH,
            source: io::Error::from_raw_os_error(errno),
        })
    }

}

#[cfg(unix)]
pub use unix::{ensure_resize_handler, install_signal_handlers, COLOR_RESET_SIGNALS};

/// Signals are a unix concept; only the tty snapshot is kept elsewhere.
#[cfg(not(unix))]
pub fn install_signal_handlers() -> crate::error::Result<()> {
    let is_tty = crate::core::ConsoleContext::global().is_tty();
    TTY_AT_INSTALL.store(is_tty, Ordering::Relaxed);
    Ok(())
}

#[cfg(not(unix))]
pub fn ensure_resize_handler() -> crate::error::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
pub mod safe {
    /// No handlers run on this platform, so there is nothing to reset.
    pub fn reset_color() {}
}
