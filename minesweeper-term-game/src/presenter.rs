use std::io;
use std::ops::ControlFlow;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use minesweeper_field::board::BoardVec;
use minesweeper_field::{Field, FieldError, Reveal};
use thiserror::Error;
use tracing::{debug, info};

use crate::surface::{Style, Surface};

const BLOWN_UP: &str = "BLOWN UP";
const STATUS_WIDTH: u16 = 30;

#[derive(Debug, Error)]
pub enum PresenterError {
  /// The terminal could not be put into game mode.
  #[error("failed to initialize the display surface: {0}")]
  SurfaceInit(#[source] io::Error),

  #[error(transparent)]
  Io(#[from] io::Error),

  #[error(transparent)]
  Field(#[from] FieldError),
}

/// Draws a field onto a [`Surface`] and turns input events into reveals.
pub struct Presenter<'a, S: Surface> {
  field: &'a mut Field,
  surface: S,
  exploded: bool,
}

impl<'a, S: Surface> Presenter<'a, S> {
  pub fn new(field: &'a mut Field, mut surface: S) -> Result<Self, PresenterError> {
    surface.clear()?;
    Ok(Self {
      field,
      surface,
      exploded: false,
    })
  }

  /// Writes one glyph per cell, plus the status line once a bomb went off.
  /// Nothing in the field changes.
  pub fn render(&mut self) -> io::Result<()> {
    for cell in self.field.cells() {
      let style = if cell.is_bomb() && cell.is_uncovered() {
        Style::Attention
      } else {
        Style::Default
      };
      self.surface.set_content(cell.x() as u16, cell.y() as u16, cell.glyph(), style)?;
    }

    if self.exploded {
      let row = self.status_row();
      draw_text(&mut self.surface, 0, row, STATUS_WIDTH, row, Style::Attention, BLOWN_UP)?;
    }
    Ok(())
  }

  /// Reveals the cell under a primary click. Clicks outside the field are
  /// dropped.
  pub fn handle_pointer_press(&mut self, x: u16, y: u16, button: MouseButton) -> Result<(), PresenterError> {
    if button == MouseButton::Left {
      let pos = BoardVec::new(i32::from(x), i32::from(y));
      match self.field.uncover(pos) {
        Ok(Reveal::Exploded) => self.exploded = true,
        Ok(Reveal::Cleared(opened)) => debug!("Click at {:?} opened {} cells", pos, opened.len()),
        Err(err @ FieldError::OutOfBounds { .. }) => debug!("Ignoring click: {}", err),
        Err(err) => return Err(err.into()),
      }
    }

    self.render()?;
    Ok(())
  }

  pub fn handle_key_press(&mut self, key: KeyEvent) -> ControlFlow<()> {
    match key.code {
      KeyCode::Esc => ControlFlow::Break(()),
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => ControlFlow::Break(()),
      _ => ControlFlow::Continue(()),
    }
  }

  pub fn handle_event(&mut self, event: Event) -> Result<ControlFlow<()>, PresenterError> {
    match event {
      Event::Resize(..) => {
        self.surface.sync()?;
        self.render()?;
      }
      Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(self.handle_key_press(key)),
      Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(button),
        column,
        row,
        ..
      }) => self.handle_pointer_press(column, row, button)?,
      _ => {}
    }
    Ok(ControlFlow::Continue(()))
  }

  /// Renders, then handles events until a quit key arrives. The surface is
  /// released before returning.
  pub fn run(mut self) -> Result<(), PresenterError> {
    self.render()?;

    loop {
      self.surface.show()?;
      let event = self.surface.poll_event()?;
      if self.handle_event(event)?.is_break() {
        break;
      }
    }

    info!("Quit requested, releasing the terminal");
    self.surface.fini()?;
    Ok(())
  }

  fn status_row(&self) -> u16 {
    self.field.height() as u16 + 1
  }
}

/// Writes `text` into the box from `(x1, y1)` to `(x2, y2)`, wrapping at `x2`
/// and cutting off anything below `y2`.
pub fn draw_text<S: Surface + ?Sized>(
  surface: &mut S,
  x1: u16,
  y1: u16,
  x2: u16,
  y2: u16,
  style: Style,
  text: &str,
) -> io::Result<()> {
  let (mut col, mut row) = (x1, y1);
  for glyph in text.chars() {
    surface.set_content(col, row, glyph, style)?;
    col += 1;
    if col >= x2 {
      row += 1;
      col = x1;
    }
    if row > y2 {
      break;
    }
  }
  Ok(())
}
