//! Progress bar renderer
//!
//! Draws a single-line ASCII bar under a locked [`ConsoleSession`]:
//!
//! ```text
//! Pulling [=============              ]  50%
//! ```
//!
//! On a terminal every frame starts by restoring the cursor position saved
//! at lock time and is padded to the full width, so a shorter frame never
//! leaves characters from a longer one behind. Off a terminal each update is
//! a plain `text N%` line, which keeps captured logs readable.
//!
//! Repeating the previously written `(text, percent)` writes nothing.
//! Control characters in labels are shown as spaces.
//!
//! [`ConsoleSession`]: crate::core::ConsoleSession

use std::borrow::Cow;
use std::io::{self, Write};

use crossterm::cursor::RestorePosition;
use crossterm::queue;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::ConsoleContext;

/// Narrowest terminal that gets a bar
pub const BAR_MIN: u16 = 10;

/// `[` and `]`
const BRACES_LEN: usize = 2;
/// `" NNN%"`
const PERCENT_LEN: usize = 5;

const FILL: u8 = b'=';
const PAD: u8 = b' ';

/// Show `text` followed by a bar at `percent`.
///
/// A console session must be locked. An empty `text` counts as no text.
///
/// # Panics
///
/// If `percent` is greater than 100.
pub fn render_progress(text: Option<&str>, percent: u32) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_progress_to(ConsoleContext::global(), &mut out, text, percent)
}

/// Show `text` alone, without a bar.
pub fn render_text(text: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_text_to(ConsoleContext::global(), &mut out, text)
}

/// [`render_progress`] against an explicit context and writer
pub fn render_progress_to<W: Write>(
    ctx: &ConsoleContext,
    out: &mut W,
    text: Option<&str>,
    percent: u32,
) -> io::Result<()> {
    assert!(percent <= 100, "progress percent {} out of range 0..=100", percent);
    render(ctx, out, text, Some(percent as u8))
}

/// [`render_text`] against an explicit context and writer
pub fn render_text_to<W: Write>(ctx: &ConsoleContext, out: &mut W, text: &str) -> io::Result<()> {
    render(ctx, out, Some(text), None)
}

fn render<W: Write>(
    ctx: &ConsoleContext,
    out: &mut W,
    text: Option<&str>,
    percent: Option<u8>,
) -> io::Result<()> {
    let text = text.filter(|t| !t.is_empty()).map(printable);
    let text = text.as_deref();

    if ctx.progress().matches(text, percent) {
        return Ok(());
    }

    if ctx.is_tty() {
        let columns = ctx.metrics().columns();
        if columns < BAR_MIN {
            return Ok(());
        }

        queue!(out, RestorePosition)?;
        match percent {
            Some(percent) => write_bar(out, usize::from(columns), text, percent)?,
            None => write_fitted(out, text.unwrap_or_default(), usize::from(columns))?,
        }
        out.flush()?;
    } else {
        write_plain_line(out, text, percent)?;
    }

    // Only a frame that made it out counts as rendered
    ctx.progress().record(text, percent);
    Ok(())
}

/// Control characters have no display width; lay them out as spaces.
fn printable(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_control) {
        Cow::Owned(text.chars().map(|c| if c.is_control() { ' ' } else { c }).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// `text N%\n`, for output that is not a terminal
fn write_plain_line<W: Write>(out: &mut W, text: Option<&str>, percent: Option<u8>) -> io::Result<()> {
    if let Some(text) = text {
        out.write_all(text.as_bytes())?;
    }
    if let Some(percent) = percent {
        if text.is_some() {
            out.write_all(b" ")?;
        }
        write!(out, "{}%", percent)?;
    }
    out.write_all(b"\n")?;
    out.flush()
}

/// One full-width bar line of exactly `columns` display columns.
fn write_bar<W: Write>(out: &mut W, columns: usize, text: Option<&str>, percent: u8) -> io::Result<()> {
    let bar_min = usize::from(BAR_MIN);
    let textlen = text.map_or(0, |t| t.width()).min(columns - bar_min);
    let barlen = columns - textlen;

    // The label's last column is the separator space
    if let Some(text) = text.filter(|_| textlen > 0) {
        write_fitted(out, text, textlen - 1)?;
        out.write_all(b" ")?;
    }

    let internal = barlen - BRACES_LEN - PERCENT_LEN;
    let filled = internal * usize::from(percent.min(100)) / 100;
    out.write_all(b"[")?;
    write_repeated(out, FILL, filled)?;
    write_repeated(out, PAD, internal - filled)?;
    write!(out, "] {:>3}%", percent)?;

    write_repeated(out, PAD, columns.saturating_sub(textlen + barlen))
}

/// Write `text` cut to `width` display columns, padding any shortfall.
///
/// A wide character that would straddle the edge is dropped rather than
/// split.
fn write_fitted<W: Write>(out: &mut W, text: &str, width: usize) -> io::Result<()> {
    let mut used = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        end = idx + ch.len_utf8();
    }
    out.write_all(text[..end].as_bytes())?;
    write_repeated(out, PAD, width - used)
}

fn write_repeated<W: Write>(out: &mut W, byte: u8, n: usize) -> io::Result<()> {
    let chunk = [byte; 32];
    let mut left = n;
    while left > 0 {
        let len = left.min(chunk.len());
        out.write_all(&chunk[..len])?;
        left -= len;
    }
    Ok(())
}
