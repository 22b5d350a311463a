//! Foreground/background color control
//!
//! Emits a fixed ANSI subset: `ESC[<mod>;<color>m` for the foreground,
//! `ESC[<color>m` for the background and `ESC[0m` to reset. Nothing is
//! written when standard output is not a terminal.
//!
//! The signal-handler variant of the reset lives in [`crate::signal::safe`].

use std::io::{self, Write};

use bitflags::bitflags;
use crossterm::execute;
use crossterm::style::ResetColor;
use serde::{Deserialize, Serialize};

use crate::core::ConsoleContext;
use crate::error::ConsoleError;
use crate::signal;

/// The eight base terminal colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Purple = 5,
    Cyan = 6,
    White = 7,
}

impl Color {
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Get color by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "black" => Some(Self::Black),
            "red" => Some(Self::Red),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "blue" => Some(Self::Blue),
            "purple" | "magenta" => Some(Self::Purple),
            "cyan" => Some(Self::Cyan),
            "white" => Some(Self::White),
            _ => None,
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ConsoleError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::by_name(&name).ok_or(ConsoleError::UnknownColor(name))
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ColorStyle: u8 {
        const REGULAR        = 0b0001;
        const BOLD           = 0b0010;
        const UNDERLINE      = 0b0100;
        const HIGH_INTENSITY = 0b1000;
    }
}

impl ColorStyle {
    /// Parse a style name such as `"bold"` or `"high_intensity"`
    pub fn parse(name: &str) -> Option<Self> {
        Self::from_name(&name.trim().replace('-', "_").to_uppercase())
    }

    /// SGR modifier for a foreground color. UNDERLINE wins over BOLD.
    fn fg_modifier(self) -> u8 {
        if self.contains(Self::UNDERLINE) {
            4
        } else if self.contains(Self::BOLD) {
            1
        } else {
            0
        }
    }
}

fn fg_code(color: Color, style: ColorStyle) -> u8 {
    if style.contains(ColorStyle::HIGH_INTENSITY) {
        90 + color.index()
    } else {
        30 + color.index()
    }
}

fn bg_code(color: Color, style: ColorStyle) -> u8 {
    if style.contains(ColorStyle::HIGH_INTENSITY) {
        100 + color.index()
    } else {
        90 + color.index()
    }
}

/// Set the output color on standard output
pub fn set_color(fg: Color, fg_style: ColorStyle, bg: Color, bg_style: ColorStyle) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    set_color_to(&mut out, ConsoleContext::global().is_tty(), fg, fg_style, bg, bg_style)
}

/// Set the output color on `out`.
///
/// The foreground is written when `fg_style` has any bit set. The background
/// is written only when `bg_style` has a bit other than `REGULAR`; of those
/// bits only `HIGH_INTENSITY` changes the code.
pub fn set_color_to<W: Write>(
    out: &mut W,
    is_tty: bool,
    fg: Color,
    fg_style: ColorStyle,
    bg: Color,
    bg_style: ColorStyle,
) -> io::Result<()> {
    if !is_tty {
        return Ok(());
    }

    if !fg_style.is_empty() {
        write!(out, "\x1b[{};{}m", fg_style.fg_modifier(), fg_code(fg, fg_style))?;
        out.flush()?;
    }

    if !bg_style.difference(ColorStyle::REGULAR).is_empty() {
        write!(out, "\x1b[{}m", bg_code(bg, bg_style))?;
        out.flush()?;
    }
    Ok(())
}

/// Reset foreground and background colors.
///
/// With `from_signal` the reset goes through the async-signal-safe path,
/// which consults the tty snapshot taken by
/// [`install_signal_handlers`](crate::signal::install_signal_handlers) and
/// never fails.
pub fn reset_color(from_signal: bool) -> io::Result<()> {
    if from_signal {
        signal::safe::reset_color();
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    reset_color_to(&mut out, ConsoleContext::global().is_tty())
}

/// Buffered reset on `out`
pub fn reset_color_to<W: Write>(out: &mut W, is_tty: bool) -> io::Result<()> {
    if !is_tty {
        return Ok(());
    }
    execute!(out, ResetColor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(fg: Color, fg_style: ColorStyle, bg: Color, bg_style: ColorStyle) -> Vec<u8> {
        let mut out = Vec::new();
        set_color_to(&mut out, true, fg, fg_style, bg, bg_style).unwrap();
        out
    }

    #[test]
    fn test_bold_foreground_without_background() {
        assert_eq!(
            emit(Color::Red, ColorStyle::BOLD, Color::Black, ColorStyle::REGULAR),
            b"\x1b[1;31m"
        );
    }

    #[test]
    fn test_foreground_modifiers() {
        let none = ColorStyle::empty();
        assert_eq!(emit(Color::Green, ColorStyle::REGULAR, Color::Black, none), b"\x1b[0;32m");
        assert_eq!(emit(Color::Green, ColorStyle::UNDERLINE, Color::Black, none), b"\x1b[4;32m");
        // UNDERLINE overrides BOLD
        assert_eq!(
            emit(Color::Green, ColorStyle::BOLD | ColorStyle::UNDERLINE, Color::Black, none),
            b"\x1b[4;32m"
        );
        // HIGH_INTENSITY moves the base and keeps the modifier
        assert_eq!(
            emit(Color::Cyan, ColorStyle::BOLD | ColorStyle::HIGH_INTENSITY, Color::Black, none),
            b"\x1b[1;96m"
        );
        // Empty style: nothing at all
        assert!(emit(Color::Cyan, none, Color::Black, none).is_empty());
    }

    #[test]
    fn test_background_codes() {
        let none = ColorStyle::empty();
        assert_eq!(emit(Color::Black, none, Color::Blue, ColorStyle::BOLD), b"\x1b[94m");
        assert_eq!(
            emit(Color::Black, none, Color::Blue, ColorStyle::HIGH_INTENSITY),
            b"\x1b[104m"
        );
        assert_eq!(
            emit(Color::White, ColorStyle::BOLD, Color::Yellow, ColorStyle::UNDERLINE),
            b"\x1b[1;37m\x1b[93m"
        );
    }

    #[test]
    fn test_not_tty_writes_nothing() {
        let mut out = Vec::new();
        set_color_to(&mut out, false, Color::Red, ColorStyle::BOLD, Color::Blue, ColorStyle::BOLD).unwrap();
        reset_color_to(&mut out, false).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_reset_sequence() {
        let mut out = Vec::new();
        reset_color_to(&mut out, true).unwrap();
        assert_eq!(out, b"\x1b[0m");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Color::by_name("Magenta"), Some(Color::Purple));
        assert_eq!(Color::by_name("orange"), None);
        assert_eq!(ColorStyle::parse("bold"), Some(ColorStyle::BOLD));
        assert_eq!(ColorStyle::parse("high-intensity"), Some(ColorStyle::HIGH_INTENSITY));
        assert_eq!(ColorStyle::parse("blink"), None);
    }
}
