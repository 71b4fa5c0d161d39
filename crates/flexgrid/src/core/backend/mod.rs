/// Crossterm backend implementation.
pub mod crossterm;

use ::crossterm::{
    Command,
    cursor::{Hide, MoveTo, Show},
    terminal::{Clear, ClearType},
};
use tracing::warn;

use crate::{error::Result, geom::Expanse};

/// The boundary between the engine and the display surface.
///
/// Implementations are shared between concurrent render passes, so both
/// methods take `&self`.
pub trait Terminal: Send + Sync {
    /// Current display size in character cells.
    fn size(&self) -> Result<Expanse>;
    /// Write raw output, including control sequences. Each render pass calls
    /// this at most once per node.
    fn write(&self, out: &str) -> Result<()>;
}

/// Append a control sequence to an output buffer.
pub(crate) fn queue(out: &mut String, cmd: impl Command) {
    if let Err(e) = cmd.write_ansi(out) {
        warn!("control sequence not queued: {e}");
    }
}

/// Append an absolute cursor move. Coordinates are zero-based cells; the
/// emitted sequence is the one-based `ESC[{row};{col}H`.
pub(crate) fn queue_cursor(out: &mut String, row: i32, col: i32) {
    let clamp = |v: i32| u16::try_from(v.max(0)).unwrap_or(u16::MAX);
    queue(out, MoveTo(clamp(col), clamp(row)));
}

/// The sequence that homes the cursor and clears the screen.
pub fn clear_screen() -> String {
    let mut out = String::from("\x1b[H");
    queue(&mut out, Clear(ClearType::All));
    out
}

/// The sequence that hides the cursor.
pub fn hide_cursor() -> String {
    let mut out = String::new();
    queue(&mut out, Hide);
    out
}

/// The sequence that shows the cursor.
pub fn show_cursor() -> String {
    let mut out = String::new();
    queue(&mut out, Show);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_sequences() {
        assert_eq!(clear_screen(), "\x1b[H\x1b[2J");
        assert_eq!(hide_cursor(), "\x1b[?25l");
        assert_eq!(show_cursor(), "\x1b[?25h");
    }

    #[test]
    fn cursor_is_one_based() {
        let mut out = String::new();
        queue_cursor(&mut out, 0, 0);
        queue_cursor(&mut out, 4, 9);
        queue_cursor(&mut out, -3, 2);
        assert_eq!(out, "\x1b[1;1H\x1b[5;10H\x1b[1;3H");
    }
}
