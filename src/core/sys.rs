//! Thin OS layer
//!
//! Window-size queries on the standard-output descriptor, tty detection and
//! an EINTR retry helper for raw syscalls.

use std::fmt;
use std::io;

use crossterm::tty::IsTty;

/// Terminal dimensions as reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub columns: u16,
    pub lines: u16,
}

/// Raw OS error number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Errno(pub i32);

impl Errno {
    /// Read the calling thread's `errno`
    pub fn last() -> Self {
        Self(io::Error::last_os_error().raw_os_error().unwrap_or(0))
    }

    #[cfg(unix)]
    pub fn is_interrupted(self) -> bool {
        self.0 == libc::EINTR
    }

    #[cfg(not(unix))]
    pub fn is_interrupted(self) -> bool {
        false
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", io::Error::from_raw_os_error(self.0))
    }
}

impl From<Errno> for io::Error {
    fn from(errno: Errno) -> Self {
        io::Error::from_raw_os_error(errno.0)
    }
}

/// Return values of C syscalls that signal failure with `-1`
pub trait SyscallReturn: Copy {
    fn is_failure(self) -> bool;
}

impl SyscallReturn for i32 {
    fn is_failure(self) -> bool {
        self == -1
    }
}

impl SyscallReturn for isize {
    fn is_failure(self) -> bool {
        self == -1
    }
}

/// Run `call` until it returns something other than `Err(EINTR)`.
pub fn retry_with<T, F>(mut call: F) -> Result<T, Errno>
where
    F: FnMut() -> Result<T, Errno>,
{
    loop {
        match call() {
            Err(errno) if errno.is_interrupted() => continue,
            other => return other,
        }
    }
}

/// Run a raw syscall, retrying while it fails with `EINTR`.
///
/// Failure is detected through [`SyscallReturn`] and the error read from
/// `errno`.
pub fn retry_eintr<T, F>(mut call: F) -> Result<T, Errno>
where
    T: SyscallReturn,
    F: FnMut() -> T,
{
    retry_with(|| {
        let ret = call();
        if ret.is_failure() {
            Err(Errno::last())
        } else {
            Ok(ret)
        }
    })
}

/// Whether standard output is attached to a terminal
pub fn stdout_is_tty() -> bool {
    io::stdout().is_tty()
}

/// Query the window size of the standard-output descriptor
#[cfg(unix)]
pub fn stdout_window_size() -> io::Result<WindowSize> {
    // SAFETY: winsize is plain old data; all-zero is a valid value.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: TIOCGWINSZ only writes into the winsize struct we own.
    retry_eintr(|| unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) })?;
    Ok(WindowSize {
        columns: ws.ws_col,
        lines: ws.ws_row,
    })
}

#[cfg(not(unix))]
pub fn stdout_window_size() -> io::Result<WindowSize> {
    let (columns, lines) = crossterm::terminal::size()?;
    Ok(WindowSize { columns, lines })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_retry_with_skips_interrupts() {
        let mut calls = 0;
        let result = retry_with(|| {
            calls += 1;
            if calls < 3 {
                Err(Errno(libc::EINTR))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn test_retry_with_stops_on_other_errors() {
        let mut calls = 0;
        let result: Result<(), Errno> = retry_with(|| {
            calls += 1;
            Err(Errno(libc::EBADF))
        });
        assert_eq!(result, Err(Errno(libc::EBADF)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retry_eintr_reports_errno() {
        // close(-1) always fails with EBADF
        let result = retry_eintr(|| unsafe { libc::close(-1) });
        assert_eq!(result, Err(Errno(libc::EBADF)));

        assert_eq!(retry_eintr(|| 7i32), Ok(7));
    }

    #[test]
    fn test_errno_into_io_error() {
        let err: io::Error = Errno(libc::ENOTTY).into();
        assert_eq!(err.raw_os_error(), Some(libc::ENOTTY));
    }
}
