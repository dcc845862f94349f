use super::board::{is_out_of_bounds, step, Board};
use super::constants::{SNAKE1_DIRECTION, SNAKE1_START, SNAKE2_DIRECTION, SNAKE2_START};
use super::types::{Cell, Direction, MatchSnapshot, PlayerId, Snake, SnakeSnapshot};
use rand::Rng;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Authoritative state of one two-player match. Input delivery and tick
/// advancement both go through the same lock.
#[derive(Debug)]
pub struct MatchSession {
  id: Uuid,
  players: [PlayerId; 2],
  state: Mutex<MatchState>,
}

#[derive(Debug, Clone)]
pub(crate) struct MatchState {
  pub(crate) board: Board,
  pub(crate) snakes: [Snake; 2],
  pub(crate) game_over: bool,
  pub(crate) winner: PlayerId,
}

impl MatchState {
  fn new() -> Self {
    let snakes = [
      Snake::new(SNAKE1_START, SNAKE1_DIRECTION),
      Snake::new(SNAKE2_START, SNAKE2_DIRECTION),
    ];
    let mut board = Board::new();
    for snake in &snakes {
      board.occupy_snake(snake);
    }
    Self {
      board,
      snakes,
      game_over: false,
      winner: 0,
    }
  }
}

impl MatchSession {
  pub fn new(player1: PlayerId, player2: PlayerId) -> Self {
    Self {
      id: Uuid::new_v4(),
      players: [player1, player2],
      state: Mutex::new(MatchState::new()),
    }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn players(&self) -> [PlayerId; 2] {
    self.players
  }

  pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
    match self.players {
      [first, second] if first == player_id => Some(second),
      [first, second] if second == player_id => Some(first),
      _ => None,
    }
  }

  fn lock(&self) -> MutexGuard<'_, MatchState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Changes a participant's direction. Unknown players and reversals are
  /// ignored; the return value reports whether the direction was applied.
  pub fn submit_input(&self, player_id: PlayerId, direction: Direction) -> bool {
    let Some(index) = self.players.iter().position(|id| *id == player_id) else {
      return false;
    };
    let mut state = self.lock();
    state.snakes[index].turn(direction)
  }

  pub fn is_game_over(&self) -> bool {
    self.lock().game_over
  }

  /// Advances the match by one step. Does nothing once the match is over.
  pub fn tick(&self) {
    self.tick_with(&mut rand::thread_rng());
  }

  pub fn tick_with<R: Rng>(&self, rng: &mut R) {
    let mut state = self.lock();
    if state.game_over {
      return;
    }
    let players = self.players;
    advance(&mut state, players, rng);
  }

  pub fn snapshot(&self) -> MatchSnapshot {
    let state = self.lock();
    MatchSnapshot {
      snakes: [
        SnakeSnapshot::from(&state.snakes[0]),
        SnakeSnapshot::from(&state.snakes[1]),
      ],
      berry: state.board.berry(),
      game_over: state.game_over,
      winner: state.winner,
    }
  }

  #[cfg(test)]
  pub(crate) fn with_state<T>(&self, f: impl FnOnce(&mut MatchState) -> T) -> T {
    f(&mut self.lock())
  }
}

fn advance<R: Rng>(state: &mut MatchState, players: [PlayerId; 2], rng: &mut R) {
  let old_heads = [state.snakes[0].head(), state.snakes[1].head()];
  let candidates = [step(&state.snakes[0]), step(&state.snakes[1])];

  if candidates[0] == candidates[1] {
    finish(state, 0);
    return;
  }

  // Occupancy is read before anything moves.
  let lose = [
    loses(state, candidates[0], old_heads[1], state.snakes[1].len()),
    loses(state, candidates[1], old_heads[0], state.snakes[0].len()),
  ];

  match lose {
    [true, true] => finish(state, 0),
    [true, false] => finish(state, players[1]),
    [false, true] => finish(state, players[0]),
    [false, false] => {
      for (snake, head) in state.snakes.iter_mut().zip(candidates) {
        snake.body.push_front(head);
        state.board.occupy(head);
      }
      let MatchState { board, snakes, .. } = state;
      for snake in snakes.iter_mut() {
        board.apply_growth_or_shrink_with(snake, rng);
      }
      // A length-1 snake's vacated head may now hold the opponent's head.
      for snake in snakes.iter() {
        board.occupy(snake.head());
      }
      if board.is_occupied(board.berry()) {
        board.place_berry_with(rng);
      }
    }
  }
}

fn loses(state: &MatchState, candidate: Cell, other_head: Cell, other_len: usize) -> bool {
  if is_out_of_bounds(candidate) {
    return true;
  }
  state.board.is_occupied(candidate) && !(candidate == other_head && other_len == 1)
}

fn finish(state: &mut MatchState, winner: PlayerId) {
  state.game_over = true;
  state.winner = winner;
}
