//! Console output.
//!
//! - **progress**: single-line ASCII progress bar, plain lines off-tty
//! - **color**: ANSI foreground/background set and reset

pub mod color;
pub mod progress;

pub use color::{reset_color, set_color, Color, ColorStyle};
pub use progress::{render_progress, render_text};
