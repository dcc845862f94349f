use super::constants::{BERRY_PLACEMENT_ATTEMPTS, BERRY_START, BOARD_SIZE};
use super::types::{Cell, Direction, Snake};
use rand::Rng;

/// Occupancy grid plus the berry. Every cell covered by a snake body is
/// marked; the berry cell is not, except for the instant a head lands on it.
#[derive(Debug, Clone)]
pub struct Board {
  occupied: Vec<bool>,
  berry: Cell,
}

/// Cell the snake's head would move into this tick. An unset direction keeps
/// the head where it is.
pub fn step(snake: &Snake) -> Cell {
  let head = snake.head();
  match snake.direction {
    Some(Direction::Up) => Cell::new(head.x, head.y + 1),
    Some(Direction::Down) => Cell::new(head.x, head.y - 1),
    Some(Direction::Left) => Cell::new(head.x - 1, head.y),
    Some(Direction::Right) => Cell::new(head.x + 1, head.y),
    None => head,
  }
}

pub fn is_out_of_bounds(cell: Cell) -> bool {
  !(0..BOARD_SIZE).contains(&cell.x) || !(0..BOARD_SIZE).contains(&cell.y)
}

impl Board {
  pub fn new() -> Self {
    Self {
      occupied: vec![false; (BOARD_SIZE * BOARD_SIZE) as usize],
      berry: BERRY_START,
    }
  }

  fn index(cell: Cell) -> Option<usize> {
    if is_out_of_bounds(cell) {
      return None;
    }
    Some((cell.x * BOARD_SIZE + cell.y) as usize)
  }

  pub fn berry(&self) -> Cell {
    self.berry
  }

  #[cfg(test)]
  pub fn set_berry(&mut self, cell: Cell) {
    self.berry = cell;
  }

  pub fn is_occupied(&self, cell: Cell) -> bool {
    Self::index(cell).map_or(false, |index| self.occupied[index])
  }

  pub fn occupy(&mut self, cell: Cell) {
    if let Some(index) = Self::index(cell) {
      self.occupied[index] = true;
    }
  }

  pub fn clear(&mut self, cell: Cell) {
    if let Some(index) = Self::index(cell) {
      self.occupied[index] = false;
    }
  }

  pub fn occupy_snake(&mut self, snake: &Snake) {
    for cell in &snake.body {
      self.occupy(*cell);
    }
  }

  /// Growth rule for a snake whose new head was just pushed. Eating the berry
  /// keeps the tail and relocates the berry; otherwise the tail is dropped and
  /// its cell cleared. Returns whether the berry was eaten.
  pub fn apply_growth_or_shrink_with<R: Rng>(&mut self, snake: &mut Snake, rng: &mut R) -> bool {
    if snake.head() == self.berry {
      self.place_berry_with(rng);
      return true;
    }
    if let Some(tail) = snake.body.pop_back() {
      self.clear(tail);
    }
    false
  }

  /// Samples free cells at random, then falls back to a linear scan. A full
  /// board leaves the berry where it was and returns `false`.
  pub fn place_berry_with<R: Rng>(&mut self, rng: &mut R) -> bool {
    for _ in 0..BERRY_PLACEMENT_ATTEMPTS {
      let cell = Cell::new(rng.gen_range(0..BOARD_SIZE), rng.gen_range(0..BOARD_SIZE));
      if !self.is_occupied(cell) {
        self.berry = cell;
        return true;
      }
    }

    for x in 0..BOARD_SIZE {
      for y in 0..BOARD_SIZE {
        let cell = Cell::new(x, y);
        if !self.is_occupied(cell) {
          self.berry = cell;
          return true;
        }
      }
    }

    false
  }
}

impl Default for Board {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn snake_at(cells: &[(i32, i32)], direction: Direction) -> Snake {
    let mut snake = Snake::new(Cell::new(cells[0].0, cells[0].1), direction);
    for &(x, y) in &cells[1..] {
      snake.body.push_back(Cell::new(x, y));
    }
    snake
  }

  fn fill_all_except(board: &mut Board, free: &[Cell]) {
    for x in 0..BOARD_SIZE {
      for y in 0..BOARD_SIZE {
        let cell = Cell::new(x, y);
        if !free.contains(&cell) {
          board.occupy(cell);
        }
      }
    }
  }

  #[test]
  fn step_moves_one_cell_along_each_axis() {
    let cases = [
      (Direction::Up, Cell::new(5, 6)),
      (Direction::Down, Cell::new(5, 4)),
      (Direction::Left, Cell::new(4, 5)),
      (Direction::Right, Cell::new(6, 5)),
    ];
    for (direction, expected) in cases {
      let snake = snake_at(&[(5, 5)], direction);
      assert_eq!(step(&snake), expected, "{direction:?}");
    }
  }

  #[test]
  fn step_with_unset_direction_keeps_head() {
    let mut snake = snake_at(&[(5, 5), (5, 4)], Direction::Up);
    snake.direction = None;
    assert_eq!(step(&snake), Cell::new(5, 5));
  }

  #[test]
  fn bounds_cover_zero_to_board_size() {
    assert!(is_out_of_bounds(Cell::new(-1, 0)));
    assert!(is_out_of_bounds(Cell::new(0, -1)));
    assert!(is_out_of_bounds(Cell::new(BOARD_SIZE, 0)));
    assert!(is_out_of_bounds(Cell::new(0, BOARD_SIZE)));
    assert!(!is_out_of_bounds(Cell::new(0, 0)));
    assert!(!is_out_of_bounds(Cell::new(BOARD_SIZE - 1, BOARD_SIZE - 1)));
  }

  #[test]
  fn occupancy_tracks_marks_and_ignores_off_board_cells() {
    let mut board = Board::new();
    assert!(!board.is_occupied(Cell::new(10, 10)));
    board.occupy(Cell::new(10, 10));
    assert!(board.is_occupied(Cell::new(10, 10)));
    assert!(!board.is_occupied(Cell::new(11, 11)));
    board.clear(Cell::new(10, 10));
    assert!(!board.is_occupied(Cell::new(10, 10)));

    board.occupy(Cell::new(-1, 3));
    assert!(!board.is_occupied(Cell::new(-1, 3)));
  }

  #[test]
  fn moving_without_berry_drops_and_clears_tail() {
    let mut board = Board::new();
    let mut snake = snake_at(&[(5, 5), (5, 4), (5, 3)], Direction::Up);
    board.occupy_snake(&snake);

    snake.body.push_front(Cell::new(5, 6));
    board.occupy(Cell::new(5, 6));
    let ate = board.apply_growth_or_shrink_with(&mut snake, &mut StdRng::seed_from_u64(1));

    assert!(!ate);
    assert_eq!(snake.len(), 3);
    assert_eq!(snake.body.back(), Some(&Cell::new(5, 4)));
    assert!(!board.is_occupied(Cell::new(5, 3)));
    assert!(board.is_occupied(Cell::new(5, 6)));
  }

  #[test]
  fn eating_berry_keeps_tail_and_moves_berry_to_free_cell() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut board = Board::new();
    board.set_berry(Cell::new(5, 5));
    let mut snake = snake_at(&[(5, 5)], Direction::Up);
    board.occupy_snake(&snake);

    let ate = board.apply_growth_or_shrink_with(&mut snake, &mut rng);

    assert!(ate);
    assert_eq!(snake.len(), 1);
    assert_ne!(board.berry(), Cell::new(5, 5));
    assert!(!board.is_occupied(board.berry()));
  }

  #[test]
  fn berry_falls_back_to_the_only_free_cell_on_near_full_board() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut board = Board::new();
    let free = Cell::new(17, 40);
    fill_all_except(&mut board, &[free]);

    assert!(board.place_berry_with(&mut rng));
    assert_eq!(board.berry(), free);
  }

  #[test]
  fn full_board_leaves_berry_unplaced() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut board = Board::new();
    board.set_berry(Cell::new(1, 2));
    fill_all_except(&mut board, &[]);

    assert!(!board.place_berry_with(&mut rng));
    assert_eq!(board.berry(), Cell::new(1, 2));
  }
}
