use serde::Serialize;
use std::collections::VecDeque;

/// Connection identity; doubles as the player id inside a match. `0` is
/// reserved for "no winner".
pub type PlayerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
  pub x: i32,
  pub y: i32,
}

impl Cell {
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }
}

impl Serialize for Cell {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    [self.x, self.y].serialize(serializer)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  /// Maps a `key_press` key to a direction. Only the `wasd` keys move.
  pub fn from_key(key: char) -> Option<Self> {
    match key {
      'w' => Some(Self::Up),
      's' => Some(Self::Down),
      'a' => Some(Self::Left),
      'd' => Some(Self::Right),
      _ => None,
    }
  }

  pub fn key(self) -> char {
    match self {
      Self::Up => 'w',
      Self::Down => 's',
      Self::Left => 'a',
      Self::Right => 'd',
    }
  }

  pub fn opposite(self) -> Self {
    match self {
      Self::Up => Self::Down,
      Self::Down => Self::Up,
      Self::Left => Self::Right,
      Self::Right => Self::Left,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
  /// Head first.
  pub body: VecDeque<Cell>,
  pub direction: Option<Direction>,
}

impl Snake {
  pub fn new(head: Cell, direction: Direction) -> Self {
    Self {
      body: VecDeque::from([head]),
      direction: Some(direction),
    }
  }

  pub fn head(&self) -> Cell {
    self.body[0]
  }

  pub fn len(&self) -> usize {
    self.body.len()
  }

  /// Applies a turn unless it would reverse the snake onto its neck.
  /// Returns whether the direction was accepted.
  pub fn turn(&mut self, direction: Direction) -> bool {
    if self.direction.map(Direction::opposite) == Some(direction) {
      return false;
    }
    self.direction = Some(direction);
    true
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnakeSnapshot {
  pub body: Vec<Cell>,
  #[serde(serialize_with = "serialize_direction")]
  pub direction: Option<Direction>,
}

impl From<&Snake> for SnakeSnapshot {
  fn from(snake: &Snake) -> Self {
    Self {
      body: snake.body.iter().copied().collect(),
      direction: snake.direction,
    }
  }
}

fn serialize_direction<S: serde::Serializer>(
  direction: &Option<Direction>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  match direction {
    Some(direction) => serializer.collect_str(&direction.key()),
    None => serializer.serialize_str(""),
  }
}

/// Read-only copy of a match taken under the match lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSnapshot {
  pub snakes: [SnakeSnapshot; 2],
  pub berry: Cell,
  pub game_over: bool,
  pub winner: PlayerId,
}
