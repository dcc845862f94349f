use crate::game::input::parse_key;
use crate::game::types::{Cell, Direction, MatchSnapshot, PlayerId, SnakeSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REASON_OPPONENT_DISCONNECTED: &str = "opponent_disconnected";
pub const STATUS_WAITING_FOR_OPPONENT: &str = "waiting_for_opponent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
  Welcome {
    #[serde(rename = "userId")]
    user_id: PlayerId,
  },
  QueueStatus {
    status: &'static str,
  },
  GameStart {
    opponent_id: PlayerId,
  },
  GameUpdate {
    snake1: SnakeSnapshot,
    snake2: SnakeSnapshot,
    berry: Cell,
    #[serde(rename = "gameOver")]
    game_over: bool,
    winner: PlayerId,
  },
  GameEnd {
    reason: &'static str,
  },
}

impl ServerMessage {
  pub fn waiting_for_opponent() -> Self {
    Self::QueueStatus {
      status: STATUS_WAITING_FOR_OPPONENT,
    }
  }

  pub fn opponent_disconnected() -> Self {
    Self::GameEnd {
      reason: REASON_OPPONENT_DISCONNECTED,
    }
  }

  pub fn encode(&self) -> serde_json::Result<String> {
    serde_json::to_string(self)
  }
}

impl From<MatchSnapshot> for ServerMessage {
  fn from(snapshot: MatchSnapshot) -> Self {
    let [snake1, snake2] = snapshot.snakes;
    Self::GameUpdate {
      snake1,
      snake2,
      berry: snapshot.berry,
      game_over: snapshot.game_over,
      winner: snapshot.winner,
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum JsonClientMessage {
  #[serde(rename = "key_press")]
  KeyPress { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
  KeyPress(Direction),
}

#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("invalid client message: {0}")]
  Json(#[from] serde_json::Error),
  #[error("unknown key {0:?}")]
  UnknownKey(String),
}

pub fn decode_client_message(text: &str) -> Result<ClientMessage, DecodeError> {
  let message = serde_json::from_str::<JsonClientMessage>(text)?;
  match message {
    JsonClientMessage::KeyPress { key } => parse_key(&key)
      .map(ClientMessage::KeyPress)
      .ok_or(DecodeError::UnknownKey(key)),
  }
}
