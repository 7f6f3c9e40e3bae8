use std::collections::BTreeSet;

use minesweeper_field::board::BoardVec;
use minesweeper_field::{Field, Reveal, MAX_DIMENSION};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn in_bounds(field: &Field, x: i32, y: i32) -> bool {
  x >= 0 && y >= 0 && x < field.width() as i32 && y < field.height() as i32
}

fn is_bomb(field: &Field, x: i32, y: i32) -> bool {
  field.get(BoardVec::new(x, y)).map(|cell| cell.is_bomb()).unwrap_or(false)
}

fn brute_force_label(field: &Field, x: i32, y: i32) -> u8 {
  let mut count = 0;
  for j in (y - 1)..=(y + 1) {
    for i in (x - 1)..=(x + 1) {
      if in_bounds(field, i, j) && is_bomb(field, i, j) {
        count += 1;
      }
    }
  }
  count
}

/// Zero-connected region of `start` plus its numbered border, found by a
/// depth-first search that recounts labels from the bomb layout.
fn expected_region(field: &Field, start: BoardVec) -> BTreeSet<BoardVec> {
  let mut region = BTreeSet::new();
  let mut stack = vec![start];
  while let Some(pos) = stack.pop() {
    if !region.insert(pos) {
      continue;
    }
    if brute_force_label(field, pos.x, pos.y) != 0 {
      continue;
    }
    for dy in -1..=1 {
      for dx in -1..=1 {
        let (x, y) = (pos.x + dx, pos.y + dy);
        if in_bounds(field, x, y) && !is_bomb(field, x, y) {
          stack.push(BoardVec::new(x, y));
        }
      }
    }
  }
  region
}

fn uncovered(field: &Field) -> BTreeSet<BoardVec> {
  field.cells().filter(|cell| cell.is_uncovered()).map(|cell| cell.pos()).collect()
}

fn field_params() -> impl Strategy<Value = (u32, u32, u32, u64)> {
  (0..=MAX_DIMENSION, 0..=MAX_DIMENSION).prop_flat_map(|(width, height)| {
    (Just(width), Just(height), 0..=width * height, any::<u64>())
  })
}

proptest! {
  #[test]
  fn bomb_count_is_exact((width, height, bombs, seed) in field_params()) {
    let field = Field::with_rng(width, height, bombs, StdRng::seed_from_u64(seed)).unwrap();
    prop_assert_eq!(field.cells().filter(|cell| cell.is_bomb()).count() as u32, bombs);
    prop_assert_eq!(field.bombs(), bombs);
  }

  #[test]
  fn labels_match_brute_force((width, height, bombs, seed) in field_params()) {
    let field = Field::with_rng(width, height, bombs, StdRng::seed_from_u64(seed)).unwrap();
    for cell in field.cells() {
      prop_assert_eq!(cell.label(), brute_force_label(&field, cell.x(), cell.y()));
    }
  }

  #[test]
  fn reveal_opens_exactly_the_reachable_region(
    (width, height, bombs, seed) in (1..=16u32, 1..=16u32).prop_flat_map(|(width, height)| {
      (Just(width), Just(height), 0..=width * height, any::<u64>())
    }),
    x in 0..16i32,
    y in 0..16i32,
  ) {
    let mut field = Field::with_rng(width, height, bombs, StdRng::seed_from_u64(seed)).unwrap();
    let start = BoardVec::new(x % width as i32, y % height as i32);
    let reveal = field.uncover(start).unwrap();

    if is_bomb(&field, start.x, start.y) {
      prop_assert_eq!(reveal, Reveal::Exploded);
      prop_assert_eq!(uncovered(&field), BTreeSet::from([start]));
    } else {
      let expected = expected_region(&field, start);
      let Reveal::Cleared(opened) = reveal else {
        panic!("safe cell reported as bomb");
      };
      prop_assert_eq!(opened.len(), expected.len());
      prop_assert_eq!(uncovered(&field), expected);
    }
  }
}

#[test]
fn default_game_scenario() {
  // 10 bombs can cover every 3x3 block of an 8x8 grid, so search for a seed
  // that leaves at least one empty cell
  let mut field = (0..)
    .map(|seed| Field::with_rng(8, 8, 10, StdRng::seed_from_u64(seed)).unwrap())
    .find(|field| field.cells().any(|cell| !cell.is_bomb() && cell.label() == 0))
    .unwrap();

  assert_eq!(field.cells().filter(|cell| cell.is_bomb()).count(), 10);
  for cell in field.cells() {
    assert_eq!(cell.label(), brute_force_label(&field, cell.x(), cell.y()));
  }

  let zero = field
    .cells()
    .find(|cell| !cell.is_bomb() && cell.label() == 0)
    .map(|cell| cell.pos())
    .unwrap();
  let bomb = field
    .cells()
    .find(|cell| cell.is_bomb())
    .map(|cell| cell.pos())
    .unwrap();

  let expected = expected_region(&field, zero);
  assert!(!field.uncover(zero).unwrap().is_bomb());
  assert_eq!(uncovered(&field), expected);
  // a zero cell always opens at least its neighbours
  assert!(expected.len() > 1);

  assert_eq!(field.uncover(bomb).unwrap(), Reveal::Exploded);
  assert!(field.get(bomb).unwrap().is_uncovered());
  assert_eq!(field.uncovered_count(), expected.len() + 1);
}
