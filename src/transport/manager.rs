use super::connection::{Connection, Outbound};
use crate::game::session::MatchSession;
use crate::game::types::{MatchSnapshot, PlayerId};
use crate::matchmaking::{MatchmakingQueue, Pair};
use crate::protocol::{decode_client_message, ClientMessage, ServerMessage};
use crate::registry::SessionRegistry;
use crate::scheduler::{MatchObserver, TickScheduler};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::UnboundedSender;

/// Owns every live connection and wires them to matchmaking, the session
/// registry and the tick scheduler.
#[derive(Debug)]
pub struct ConnectionManager {
    connections: DashMap<PlayerId, Arc<Connection>>,
    next_id: AtomicU32,
    running: AtomicBool,
    requeue_after_game: bool,
    registry: Arc<SessionRegistry>,
    queue: MatchmakingQueue,
    scheduler: TickScheduler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManagerStats {
    pub connections: usize,
    pub waiting: usize,
    pub matches: usize,
}

impl ConnectionManager {
    pub fn new(
        registry: Arc<SessionRegistry>,
        scheduler: TickScheduler,
        requeue_after_game: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            connections: DashMap::new(),
            next_id: AtomicU32::new(1),
            running: AtomicBool::new(true),
            requeue_after_game,
            registry,
            queue: MatchmakingQueue::new(),
            scheduler,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            connections: self.connections.len(),
            waiting: self.queue.len(),
            matches: self.registry.match_count(),
        }
    }

    /// Registers a connection whose handshake just completed: assigns its
    /// id, greets it and puts it in the matchmaking queue. Returns `None`
    /// after shutdown.
    pub fn connect(self: &Arc<Self>, outbound: UnboundedSender<Outbound>) -> Option<Arc<Connection>> {
        if !self.is_running() {
            let _ = outbound.send(Outbound::Close);
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let connection = Arc::new(Connection::new(id, outbound));
        self.connections.insert(id, Arc::clone(&connection));
        tracing::info!(player_id = id, "player connected");

        connection.send(&ServerMessage::Welcome { user_id: id });
        self.enqueue(Arc::clone(&connection));
        Some(connection)
    }

    pub fn handle_text_message(&self, player_id: PlayerId, text: &str) {
        let message = match decode_client_message(text) {
            Ok(message) => message,
            Err(error) => {
                tracing::debug!(player_id, %error, "dropping client message");
                return;
            }
        };
        match message {
            ClientMessage::KeyPress(direction) => {
                if let Some(session) = self.registry.lookup(player_id) {
                    session.submit_input(player_id, direction);
                }
            }
        }
    }

    /// Cleans up after a closed or failed connection. A match in progress is
    /// torn down and the opponent goes back into the queue.
    pub fn disconnect(self: &Arc<Self>, player_id: PlayerId) {
        let removed = self.connections.remove(&player_id);
        self.queue.remove(player_id);
        if removed.is_none() {
            return;
        }
        tracing::info!(player_id, "player disconnected");

        let Some(session) = self.registry.lookup(player_id) else { return };
        // A pairing that registers after this point sees the player gone and
        // unwinds itself; whichever side unregisters handles the survivor.
        if !self.registry.unregister(&session) {
            return;
        }
        let Some(opponent_id) = session.opponent_of(player_id) else { return };
        let Some(opponent) = self.connection(opponent_id) else { return };

        tracing::info!(match_id = %session.id(), player_id, opponent_id, "match abandoned");
        opponent.send(&ServerMessage::opponent_disconnected());
        opponent.set_in_game(false);
        self.enqueue(opponent);
    }

    pub fn connection(&self, player_id: PlayerId) -> Option<Arc<Connection>> {
        self.connections
            .get(&player_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Stops admitting connections and closes every live one.
    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        for entry in self.connections.iter() {
            entry.value().close();
        }
        self.connections.clear();
        self.queue.clear();
        tracing::info!("connection manager shut down");
    }

    fn enqueue(self: &Arc<Self>, connection: Arc<Connection>) {
        if !self.is_running() || connection.in_game() {
            return;
        }
        connection.send(&ServerMessage::waiting_for_opponent());
        if let Some(pair) = self.queue.enqueue(connection) {
            self.start_match(pair);
        }
    }

    fn start_match(self: &Arc<Self>, (first, second): Pair) {
        let session = Arc::new(MatchSession::new(first.id(), second.id()));
        if !self.registry.register(Arc::clone(&session)) {
            tracing::warn!(
                player1 = first.id(),
                player2 = second.id(),
                "participant already registered in a match"
            );
            first.set_in_game(false);
            second.set_in_game(false);
            return;
        }

        // Checked only after registering, so a disconnect racing this call
        // either finds the match in the registry or is seen here.
        let first_live = self.connections.contains_key(&first.id());
        let second_live = self.connections.contains_key(&second.id());
        if !first_live || !second_live {
            if !self.registry.unregister(&session) {
                return;
            }
            tracing::warn!(
                player1 = first.id(),
                player2 = second.id(),
                "participant left before match start"
            );
            for (connection, live) in [(first, first_live), (second, second_live)] {
                connection.set_in_game(false);
                if live {
                    self.enqueue(connection);
                }
            }
            return;
        }

        tracing::info!(
            match_id = %session.id(),
            player1 = first.id(),
            player2 = second.id(),
            "match started"
        );
        first.send(&ServerMessage::GameStart {
            opponent_id: second.id(),
        });
        second.send(&ServerMessage::GameStart {
            opponent_id: first.id(),
        });

        let notifier = Arc::new(MatchNotifier {
            manager: Arc::downgrade(self),
            players: [Arc::downgrade(&first), Arc::downgrade(&second)],
        });
        self.scheduler.start(&session, notifier);
    }

    fn finish_match(self: &Arc<Self>, players: &[Weak<Connection>; 2]) {
        for connection in players.iter().filter_map(Weak::upgrade) {
            connection.set_in_game(false);
            if self.requeue_after_game && self.connections.contains_key(&connection.id()) {
                self.enqueue(connection);
            }
        }
    }
}

/// Pushes tick results to the two participants. Holds only weak handles so a
/// dropped client is skipped rather than kept alive.
struct MatchNotifier {
    manager: Weak<ConnectionManager>,
    players: [Weak<Connection>; 2],
}

impl MatchObserver for MatchNotifier {
    fn on_tick(&self, snapshot: &MatchSnapshot) {
        let payload = match ServerMessage::from(snapshot.clone()).encode() {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(?error, "failed to encode game update");
                return;
            }
        };
        for connection in self.players.iter().filter_map(Weak::upgrade) {
            connection.send_update(payload.clone());
        }
    }

    fn on_finished(&self, _snapshot: &MatchSnapshot) {
        if let Some(manager) = self.manager.upgrade() {
            manager.finish_match(&self.players);
        }
    }
}
