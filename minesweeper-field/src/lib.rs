//! Minesweeper field model: bomb placement, adjacency labels and the
//! flood-fill reveal. No I/O happens here.

use core::fmt;

use board::{Board, BoardExplorer, BoardVec};
use rand::seq::SliceRandom;
use rand::RngCore;
use tracing::{debug, info, warn};

pub mod board;
mod error;

pub use error::FieldError;

/// Largest accepted width and height.
pub const MAX_DIMENSION: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
  is_bomb: bool,
  label: u8,
  flagged: bool,
  uncovered: bool,
  pos: BoardVec,
}

impl Cell {
  pub fn is_bomb(&self) -> bool {
    self.is_bomb
  }

  /// Number of bombs in the 3x3 block around this cell, the cell itself
  /// included. Only meaningful for cells that are not bombs.
  pub fn label(&self) -> u8 {
    self.label
  }

  /// Reserved for marking suspected bombs. Nothing sets it yet.
  pub fn is_flagged(&self) -> bool {
    self.flagged
  }

  pub fn is_uncovered(&self) -> bool {
    self.uncovered
  }

  pub fn pos(&self) -> BoardVec {
    self.pos
  }

  pub fn x(&self) -> i32 {
    self.pos.x
  }

  pub fn y(&self) -> i32 {
    self.pos.y
  }

  /// `x` for an uncovered bomb, the label digit for an uncovered safe cell
  /// and `o` for anything still covered.
  pub fn glyph(&self) -> char {
    match (self.uncovered, self.is_bomb) {
      (true, true) => 'x',
      (true, false) => char::from(b'0' + self.label),
      (false, _) => 'o',
    }
  }
}

/// Result of [`Field::uncover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reveal {
  /// The target was a bomb.
  Exploded,
  /// The target was safe. Holds the newly uncovered positions in the order
  /// the flood fill reached them; empty if the target was already uncovered.
  Cleared(Vec<BoardVec>),
}

impl Reveal {
  pub fn is_bomb(&self) -> bool {
    matches!(self, Reveal::Exploded)
  }
}

/// Collects bomb positions before the labels are computed.
pub struct FieldBuilder {
  bombs: Board<bool>,
  rng: Box<dyn RngCore>,
}

impl FieldBuilder {
  pub fn new(width: u32, height: u32) -> Result<Self, FieldError> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
      return Err(FieldError::InvalidDimensions { width, height });
    }

    Ok(Self {
      bombs: Board::new(width, height, false),
      rng: Box::new(rand::thread_rng()),
    })
  }

  /// Replaces the random source used by [`add_random_bombs`](Self::add_random_bombs).
  pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
    self.rng = Box::new(rng);
    self
  }

  pub fn set_bomb(&mut self, pos: BoardVec) -> Result<(), FieldError> {
    let (width, height) = (self.bombs.width, self.bombs.height);
    let slot = self
      .bombs
      .get_mut(pos)
      .ok_or(FieldError::OutOfBounds { pos, width, height })?;
    *slot = true;
    Ok(())
  }

  /// Places `bombs` new bombs on distinct free cells, uniformly at random.
  pub fn add_random_bombs(&mut self, bombs: u32) -> Result<(), FieldError> {
    let mut free: Vec<_> = self.bombs.positions().filter(|&pos| !self.bombs[pos]).collect();
    let capacity = free.len() as u32;
    if bombs > capacity {
      return Err(FieldError::TooManyBombs { bombs, capacity });
    }

    // partial Fisher-Yates: the first `bombs` entries are a uniform sample
    let (chosen, _) = free.partial_shuffle(&mut self.rng, bombs as usize);
    for &pos in chosen.iter() {
      self.bombs[pos] = true;
    }

    Ok(())
  }

  pub fn build(self) -> Field {
    let bombs = &self.bombs;
    let cells = Board::from_fn(bombs.width, bombs.height, |pos| Cell {
      is_bomb: bombs[pos],
      label: bombs.get_block(pos).filter(|&&is_bomb| is_bomb).count() as u8,
      flagged: false,
      uncovered: false,
      pos,
    });
    let bomb_count = bombs.iter().filter(|&&is_bomb| is_bomb).count() as u32;

    info!(
      width = bombs.width,
      height = bombs.height,
      bombs = bomb_count,
      "Created minesweeper field"
    );

    Field {
      cells,
      bombs: bomb_count,
    }
  }
}

impl From<FieldBuilder> for Field {
  fn from(builder: FieldBuilder) -> Self {
    builder.build()
  }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Field {
  cells: Board<Cell>,
  bombs: u32,
}

impl Field {
  /// Creates a field with `bombs` randomly placed bombs using the thread-local RNG.
  pub fn new(width: u32, height: u32, bombs: u32) -> Result<Self, FieldError> {
    Self::with_rng(width, height, bombs, rand::thread_rng())
  }

  /// Same as [`Field::new`] but draws bomb positions from `rng`.
  pub fn with_rng(width: u32, height: u32, bombs: u32, rng: impl RngCore + 'static) -> Result<Self, FieldError> {
    let mut builder = FieldBuilder::new(width, height)?.with_rng(rng);
    builder.add_random_bombs(bombs)?;
    Ok(builder.build())
  }

  pub fn width(&self) -> u32 {
    self.cells.width
  }

  pub fn height(&self) -> u32 {
    self.cells.height
  }

  pub fn bombs(&self) -> u32 {
    self.bombs
  }

  /// All cells in row-major order.
  pub fn cells(&self) -> impl Iterator<Item = &Cell> {
    self.cells.iter()
  }

  pub fn uncovered_count(&self) -> usize {
    self.cells().filter(|cell| cell.uncovered).count()
  }

  pub fn get(&self, pos: BoardVec) -> Result<&Cell, FieldError> {
    self.cells.get(pos).ok_or(FieldError::OutOfBounds {
      pos,
      width: self.width(),
      height: self.height(),
    })
  }

  /// Uncovers the cell at `pos`.
  ///
  /// A bomb only uncovers itself. A safe cell starts a breadth-first flood
  /// fill that spreads through cells labelled 0 and stops at the first ring
  /// of numbered cells, which are uncovered but not expanded. Uncovering an
  /// already uncovered cell changes nothing.
  pub fn uncover(&mut self, pos: BoardVec) -> Result<Reveal, FieldError> {
    let target = *self.get(pos)?;

    if target.is_bomb {
      if !target.uncovered {
        warn!("Bomb uncovered at {:?}", pos);
        self.cells[pos].uncovered = true;
      }
      return Ok(Reveal::Exploded);
    }

    if target.uncovered {
      debug!("Cell {:?} is already uncovered", pos);
      return Ok(Reveal::Cleared(Vec::new()));
    }

    let mut opened = Vec::new();
    let mut explorer = BoardExplorer::from(&self.cells);
    explorer.enqueue(pos);

    while let Some(pos) = explorer.pop() {
      let cell = &mut self.cells[pos];
      cell.uncovered = true;
      opened.push(pos);

      if cell.label == 0 {
        let cells = &self.cells;
        explorer.enqueue_all(cells.neighbours_of(pos).filter(|&neighbour| {
          let neighbour = &cells[neighbour];
          !neighbour.is_bomb && !neighbour.uncovered
        }));
      }
    }

    debug!("Uncovering {:?} opened {} cells", pos, opened.len());
    Ok(Reveal::Cleared(opened))
  }
}

impl fmt::Debug for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for y in 0..self.height() {
      for x in 0..self.width() {
        let pos = BoardVec::new(x as i32, y as i32);
        write!(f, "{}", self.cells[pos].glyph())?;
      }
      writeln!(f)?;
    }

    Ok(())
  }
}
