//! Display surface the presenter draws into, plus the crossterm backed
//! terminal implementation.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
  self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::debug;

use crate::presenter::PresenterError;

const BACKGROUND: Color = Color::Black;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
  #[default]
  Default,
  /// Drawn in red; used for bombs and the blown-up message.
  Attention,
}

impl Style {
  fn foreground(self) -> Color {
    match self {
      Style::Default => Color::White,
      Style::Attention => Color::Red,
    }
  }
}

/// A character grid that accepts glyphs and hands out raw input events.
pub trait Surface {
  fn clear(&mut self) -> io::Result<()>;

  fn set_content(&mut self, x: u16, y: u16, glyph: char, style: Style) -> io::Result<()>;

  /// Makes everything written since the last call visible.
  fn show(&mut self) -> io::Result<()>;

  /// Called after a resize; the caller redraws afterwards.
  fn sync(&mut self) -> io::Result<()>;

  /// Blocks until the next input event.
  fn poll_event(&mut self) -> io::Result<Event>;

  /// Gives the underlying device back. Calling it more than once is a no-op.
  fn fini(&mut self) -> io::Result<()>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
  fn clear(&mut self) -> io::Result<()> {
    (**self).clear()
  }

  fn set_content(&mut self, x: u16, y: u16, glyph: char, style: Style) -> io::Result<()> {
    (**self).set_content(x, y, glyph, style)
  }

  fn show(&mut self) -> io::Result<()> {
    (**self).show()
  }

  fn sync(&mut self) -> io::Result<()> {
    (**self).sync()
  }

  fn poll_event(&mut self) -> io::Result<Event> {
    (**self).poll_event()
  }

  fn fini(&mut self) -> io::Result<()> {
    (**self).fini()
  }
}

/// Raw-mode alternate screen with mouse and paste capture.
///
/// The terminal is restored by [`Surface::fini`], or on drop if that never
/// ran.
pub struct TerminalSurface {
  writer: BufWriter<Stdout>,
  active: bool,
}

impl TerminalSurface {
  pub fn new() -> Result<Self, PresenterError> {
    let mut surface = Self {
      writer: BufWriter::new(io::stdout()),
      active: false,
    };
    surface.init().map_err(PresenterError::SurfaceInit)?;
    Ok(surface)
  }

  fn init(&mut self) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    // from here on drop has something to undo
    self.active = true;
    execute!(
      self.writer,
      EnterAlternateScreen,
      Hide,
      EnableMouseCapture,
      EnableBracketedPaste,
      SetBackgroundColor(BACKGROUND),
      Clear(ClearType::All)
    )
  }
}

impl Surface for TerminalSurface {
  fn clear(&mut self) -> io::Result<()> {
    queue!(self.writer, SetBackgroundColor(BACKGROUND), Clear(ClearType::All))
  }

  fn set_content(&mut self, x: u16, y: u16, glyph: char, style: Style) -> io::Result<()> {
    queue!(
      self.writer,
      MoveTo(x, y),
      SetForegroundColor(style.foreground()),
      SetBackgroundColor(BACKGROUND),
      Print(glyph)
    )
  }

  fn show(&mut self) -> io::Result<()> {
    self.writer.flush()
  }

  fn sync(&mut self) -> io::Result<()> {
    let (columns, rows) = terminal::size()?;
    debug!("Terminal resized to {}x{}", columns, rows);
    self.clear()
  }

  fn poll_event(&mut self) -> io::Result<Event> {
    event::read()
  }

  fn fini(&mut self) -> io::Result<()> {
    if !self.active {
      return Ok(());
    }
    self.active = false;

    let restored = execute!(
      self.writer,
      ResetColor,
      DisableBracketedPaste,
      DisableMouseCapture,
      Show,
      LeaveAlternateScreen
    );
    leave_raw_mode(restored, terminal::disable_raw_mode)
  }
}

/// Runs `disable_raw_mode` even if writing the restore sequences failed and
/// reports the first error.
fn leave_raw_mode(restored: io::Result<()>, disable_raw_mode: impl FnOnce() -> io::Result<()>) -> io::Result<()> {
  let raw_mode = disable_raw_mode();
  restored.and(raw_mode)
}

impl Drop for TerminalSurface {
  fn drop(&mut self) {
    let _ = self.fini();
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  #[test]
  fn raw_mode_is_left_after_a_failed_write() {
    let disabled = Cell::new(false);
    let result = leave_raw_mode(Err(io::Error::other("broken pipe")), || {
      disabled.set(true);
      Ok(())
    });
    assert!(disabled.get());
    assert_eq!(result.unwrap_err().to_string(), "broken pipe");
  }

  #[test]
  fn first_error_wins() {
    let result = leave_raw_mode(Ok(()), || Err(io::Error::other("tcsetattr failed")));
    assert_eq!(result.unwrap_err().to_string(), "tcsetattr failed");

    let result = leave_raw_mode(Err(io::Error::other("write failed")), || {
      Err(io::Error::other("tcsetattr failed"))
    });
    assert_eq!(result.unwrap_err().to_string(), "write failed");
  }
}
