use crate::game::types::PlayerId;
use crate::transport::connection::Connection;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type Pair = (Arc<Connection>, Arc<Connection>);

/// Waiting connections in arrival order. Pairing happens under this lock
/// only; match creation is left to the caller.
#[derive(Debug, Default)]
pub struct MatchmakingQueue {
    waiting: Mutex<VecDeque<Arc<Connection>>>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<Connection>>> {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends to the tail and immediately tries to pair.
    pub fn enqueue(&self, connection: Arc<Connection>) -> Option<Pair> {
        {
            let mut waiting = self.lock();
            if !waiting.iter().any(|queued| queued.id() == connection.id()) {
                waiting.push_back(connection);
            }
        }
        self.try_pair()
    }

    /// Pops the two oldest waiters and marks them in game.
    pub fn try_pair(&self) -> Option<Pair> {
        let mut waiting = self.lock();
        if waiting.len() < 2 {
            return None;
        }
        let first = waiting.pop_front()?;
        let second = waiting.pop_front()?;
        first.set_in_game(true);
        second.set_in_game(true);
        Some((first, second))
    }

    pub fn remove(&self, player_id: PlayerId) -> bool {
        let mut waiting = self.lock();
        let before = waiting.len();
        waiting.retain(|connection| connection.id() != player_id);
        waiting.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
