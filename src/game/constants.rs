use super::types::{Cell, Direction};

pub const BOARD_SIZE: i32 = 64;
pub const BERRY_PLACEMENT_ATTEMPTS: usize = 100;
pub const TICK_MS: u64 = 333;

pub const SNAKE1_START: Cell = Cell { x: 0, y: 0 };
pub const SNAKE1_DIRECTION: Direction = Direction::Up;
pub const SNAKE2_START: Cell = Cell {
  x: BOARD_SIZE - 1,
  y: BOARD_SIZE - 1,
};
pub const SNAKE2_DIRECTION: Direction = Direction::Down;
pub const BERRY_START: Cell = Cell {
  x: BOARD_SIZE / 2,
  y: BOARD_SIZE / 2,
};
