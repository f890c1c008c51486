use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::{room_store::RoomStore, session::MemorySessionStore},
    dto::{
        room::{JoinGameRequest, RoomSnapshot},
        ws::{ClientMessage, ServerMessage},
    },
    error::ServiceError,
    services::{room_client::RoomClient, room_service},
    state::{
        RoomHandle, SharedState,
        membership::MembershipChange,
        room::{RoomState, TeamId},
    },
};

/// Internal error type for WebSocket request handling.
///
/// Everything except [`SessionError::ConnectionClosed`] is reported back to the
/// client as an `error` message and the session continues.
#[derive(Debug, Error)]
enum SessionError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
    /// Request needs the connection to be a team first.
    #[error("identify or join before editing scores")]
    NoTeam,
    /// Frame could not be parsed.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Message type is not part of the protocol.
    #[error("unsupported message type")]
    Unsupported,
    /// Rejected by the service layer.
    #[error("{0}")]
    Service(#[from] ServiceError),
}

/// Handle the full lifecycle of one client connected to a room.
pub async fn handle_socket(state: SharedState, room: RoomHandle, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut client = RoomClient::new(room.store.clone(), Arc::new(MemorySessionStore::new()));
    let mut snapshots = room.store.subscribe();
    // Mark the current value as unseen so the first snapshot goes out immediately.
    snapshots.mark_changed();

    info!(room = %room.code, "room client connected");

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                if forward_snapshot(&room, &mut client, &mut snapshots, &outbound_tx).is_err() {
                    info!(room = %room.code, "connection closed while pushing snapshot");
                    break;
                }
            }
            message = receiver.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        let result = handle_text(&state, &room, &mut client, text.as_str(), &outbound_tx);
                        match result {
                            Ok(()) => {}
                            Err(SessionError::ConnectionClosed) => break,
                            Err(err) => {
                                warn!(room = %room.code, error = %err, "rejected client message");
                                let reply = ServerMessage::Error { message: err.to_string() };
                                if send_message_to_websocket(&outbound_tx, &reply).is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = outbound_tx.send(Message::Pong(payload));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let _ = outbound_tx.send(Message::Close(frame));
                        break;
                    }
                    Some(Ok(Message::Binary(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Err(err)) => {
                        warn!(room = %room.code, error = %err, "websocket error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    info!(room = %room.code, team_id = ?client.team_id(), "room client disconnected");
    finalize(writer_task, outbound_tx).await;
}

/// Dispatch one text frame to the matching room operation.
fn handle_text(
    state: &SharedState,
    room: &RoomHandle,
    client: &mut RoomClient,
    text: &str,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), SessionError> {
    match ClientMessage::from_json_str(text)? {
        ClientMessage::Identify { team_id } => {
            client.adopt(team_id);
            let current = room.store.snapshot();
            announce_membership(client, &current, team_id, outbound_tx)
        }
        ClientMessage::Join { name } => {
            JoinGameRequest { name: name.clone() }
                .validate()
                .map_err(ServiceError::from)?;
            let name = room_service::sanitize_team_name(&name)?;
            let team_id = client.join_game(name);
            info!(room = %room.code, team_id = %team_id, "team joined over websocket");
            send_message_to_websocket(outbound_tx, &ServerMessage::Joined { team_id })
        }
        ClientMessage::AddScore { value } => {
            let team_id = client.team_id().ok_or(SessionError::NoTeam)?;
            room_service::add_score(state, room, team_id, value)?;
            Ok(())
        }
        ClientMessage::DeleteScore { score_id } => {
            let team_id = client.team_id().ok_or(SessionError::NoTeam)?;
            room_service::delete_score(state, room, team_id, score_id)?;
            Ok(())
        }
        ClientMessage::RemoveTeam { team_id } => {
            room_service::remove_team(room, team_id);
            Ok(())
        }
        ClientMessage::FinishGame => {
            room_service::finish_game(room);
            Ok(())
        }
        ClientMessage::Unknown => Err(SessionError::Unsupported),
    }
}

/// Tell a client that just identified whether its team is still around.
fn announce_membership(
    client: &mut RoomClient,
    current: &RoomState,
    team_id: TeamId,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), SessionError> {
    let reply = match client.observe(Some(current)) {
        MembershipChange::Unchanged => ServerMessage::Joined { team_id },
        MembershipChange::Left(team_id) => ServerMessage::Left { team_id },
    };
    send_message_to_websocket(outbound_tx, &reply)
}

/// Take the latest value from the room subscription and push it to the client.
fn forward_snapshot(
    room: &RoomHandle,
    client: &mut RoomClient,
    snapshots: &mut watch::Receiver<RoomState>,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), SessionError> {
    let current = snapshots.borrow_and_update().clone();
    push_snapshot(room, client, &current, outbound_tx)
}

/// Send the latest snapshot, then a `left` notice if the client's team vanished.
fn push_snapshot(
    room: &RoomHandle,
    client: &mut RoomClient,
    current: &RoomState,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), SessionError> {
    send_message_to_websocket(
        outbound_tx,
        &ServerMessage::Snapshot {
            room: RoomSnapshot::new(&room.code, current),
        },
    )?;

    if let MembershipChange::Left(team_id) = client.observe(Some(current)) {
        send_message_to_websocket(outbound_tx, &ServerMessage::Left { team_id })?;
    }
    Ok(())
}

/// Serialize a payload and push it onto the provided WebSocket sender.
///
/// Serialization failures are logged and swallowed; only a closed writer is
/// reported so the caller can end the session.
fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), SessionError>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| SessionError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
