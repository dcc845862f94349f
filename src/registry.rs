use crate::game::session::MatchSession;
use crate::game::types::PlayerId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Maps every participant to the match they are playing. Both ids of a match
/// point at the same session and are inserted and removed together.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<PlayerId, Arc<MatchSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` without touching the map if either participant is
    /// already in a match.
    pub fn register(&self, session: Arc<MatchSession>) -> bool {
        let [first, second] = session.players();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if first == second || sessions.contains_key(&first) || sessions.contains_key(&second) {
            return false;
        }
        sessions.insert(first, Arc::clone(&session));
        sessions.insert(second, session);
        true
    }

    pub fn lookup(&self, player_id: PlayerId) -> Option<Arc<MatchSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&player_id)
            .cloned()
    }

    /// Removes both participants' entries in one step. Entries that already
    /// point at a newer match are left alone, so this is safe to call late or
    /// more than once. Returns `true` only for the call that removed the
    /// match, which makes that caller responsible for the aftermath.
    pub fn unregister(&self, session: &MatchSession) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = false;
        for player_id in session.players() {
            let is_this_match = sessions
                .get(&player_id)
                .map_or(false, |registered| std::ptr::eq(Arc::as_ptr(registered), session));
            if is_this_match {
                sessions.remove(&player_id);
                removed = true;
            }
        }
        removed
    }

    /// Number of distinct matches currently registered.
    pub fn match_count(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len() / 2
    }
}
