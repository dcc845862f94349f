use super::connection::Outbound;
use super::manager::ConnectionManager;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn handle_socket(socket: WebSocket, manager: Arc<ConnectionManager>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let Some(connection) = manager.connect(tx) else {
        let _ = sender.send(Message::Close(None)).await;
        return;
    };
    let player_id = connection.id();
    let latest = connection.latest_frame();
    drop(connection);

    let send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let payload = match outbound {
                Outbound::Text(payload) => payload,
                Outbound::Update => match latest.take_latest() {
                    Some(payload) => payload,
                    None => continue,
                },
                Outbound::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    return;
                }
            };
            if let Err(error) = sender.send(Message::Text(payload)).await {
                tracing::warn!(?error, player_id, "write failed");
                return;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let message = match result {
            Ok(message) => message,
            Err(error) => {
                tracing::debug!(?error, player_id, "read failed");
                break;
            }
        };
        match message {
            Message::Text(text) => manager.handle_text_message(player_id, &text),
            Message::Close(_) => break,
            _ => {}
        }
    }

    manager.disconnect(player_id);
    send_task.abort();
}
