//! Async-signal-safe output
//!
//! Everything here may run inside a signal handler: no allocation, no
//! buffered I/O, no locks, no logging. Only `write(2)` and atomic loads.

use std::os::raw::c_int;

/// `ESC[0m`
const RESET_SEQUENCE: &[u8] = b"\x1b[0m";

/// Reset colors on standard output if it was a terminal when the signal
/// handlers were installed.
pub fn reset_color() {
    reset_color_on(libc::STDOUT_FILENO, super::tty_snapshot());
}

pub(crate) fn reset_color_on(fd: c_int, is_tty: bool) {
    if !is_tty {
        return;
    }
    let _ = write_all_raw(fd, RESET_SEQUENCE);
}

/// Write all of `bytes` to `fd` with raw `write(2)` calls.
///
/// Short writes are continued; any error (including `EINTR`) abandons the
/// write and returns false.
pub fn write_all_raw(fd: c_int, bytes: &[u8]) -> bool {
    let mut written = 0;
    while written < bytes.len() {
        let rest = &bytes[written..];
        // SAFETY: `rest` is a live slice for the duration of the call.
        let ret = unsafe { libc::write(fd, rest.as_ptr().cast(), rest.len()) };
        if ret <= 0 {
            return false;
        }
        written += ret as usize;
    }
    true
}
