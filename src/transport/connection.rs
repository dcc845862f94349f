use crate::game::types::PlayerId;
use crate::protocol::ServerMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

/// Frames queued for a connection's single writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    /// Write whatever `LatestFrame` holds when this is reached.
    Update,
    Close,
}

/// Newest unsent `game_update` payload. Only one `Outbound::Update` marker is
/// queued at a time, so a client that stops reading holds one state frame
/// instead of every tick since.
#[derive(Debug, Default)]
pub struct LatestFrame {
    frame: Mutex<Option<String>>,
    queued: AtomicBool,
}

impl LatestFrame {
    /// Replaces the pending payload. Returns `true` when the caller must queue
    /// a marker for it.
    fn store(&self, payload: String) -> bool {
        *self.frame.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload);
        !self.queued.swap(true, Ordering::SeqCst)
    }

    pub fn take_latest(&self) -> Option<String> {
        self.queued.store(false, Ordering::SeqCst);
        self.frame.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// A client that completed the WebSocket handshake. Everything written to the
/// socket goes through `outbound`, so frames from the read path and from tick
/// broadcasts never interleave.
#[derive(Debug)]
pub struct Connection {
    id: PlayerId,
    outbound: UnboundedSender<Outbound>,
    latest: Arc<LatestFrame>,
    in_game: AtomicBool,
}

impl Connection {
    pub fn new(id: PlayerId, outbound: UnboundedSender<Outbound>) -> Self {
        Self {
            id,
            outbound,
            latest: Arc::new(LatestFrame::default()),
            in_game: AtomicBool::new(false),
        }
    }

    pub fn latest_frame(&self) -> Arc<LatestFrame> {
        Arc::clone(&self.latest)
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn in_game(&self) -> bool {
        self.in_game.load(Ordering::SeqCst)
    }

    pub fn set_in_game(&self, in_game: bool) {
        self.in_game.store(in_game, Ordering::SeqCst);
    }

    /// Best effort; failures are logged and reported as `false`.
    pub fn send(&self, message: &ServerMessage) -> bool {
        match message.encode() {
            Ok(payload) => self.send_text(payload),
            Err(error) => {
                tracing::warn!(?error, player_id = self.id, "failed to encode server message");
                false
            }
        }
    }

    fn send_text(&self, payload: String) -> bool {
        self.push(Outbound::Text(payload))
    }

    /// Queues a state frame, superseding one that has not been written yet.
    pub fn send_update(&self, payload: String) -> bool {
        if self.latest.store(payload) {
            return self.push(Outbound::Update);
        }
        !self.outbound.is_closed()
    }

    fn push(&self, outbound: Outbound) -> bool {
        if self.outbound.send(outbound).is_err() {
            tracing::debug!(player_id = self.id, "dropping message for closed connection");
            return false;
        }
        true
    }

    pub fn close(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}
