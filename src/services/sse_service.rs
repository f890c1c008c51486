use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tracing::{info, warn};

use crate::{
    dao::room_store::RoomStore,
    dto::{room::RoomSnapshot, sse::ServerEvent},
    state::{RoomHandle, room::RoomState},
};

const EVENT_ROOM_SNAPSHOT: &str = "room.snapshot";

/// Build the SSE payload for one room snapshot.
pub fn snapshot_event(code: &str, room: &RoomState) -> serde_json::Result<ServerEvent> {
    ServerEvent::json(
        Some(EVENT_ROOM_SNAPSHOT.to_string()),
        &RoomSnapshot::new(code, room),
    )
}

/// Stream the room's snapshots, starting with the current one, until the
/// client disconnects.
pub fn to_sse_stream(room: &RoomHandle) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(spawn_snapshot_forwarder(room))
        .map(|payload| Ok::<_, Infallible>(to_event(payload)));
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Spawn the task feeding one SSE client: the current snapshot first, then one
/// payload per change, until the returned receiver is dropped.
fn spawn_snapshot_forwarder(room: &RoomHandle) -> mpsc::Receiver<ServerEvent> {
    let mut receiver = room.store.subscribe();
    let code = room.code.clone();
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<ServerEvent>(8);

    tokio::spawn(async move {
        // Mark the current value as unseen so the first snapshot goes out immediately.
        receiver.mark_changed();
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                changed = receiver.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let Some(payload) = next_payload(&code, &mut receiver) else {
                        continue;
                    };
                    if tx.send(payload).await.is_err() {
                        break;
                    }
                }
            }
        }

        info!(room = %code, "room SSE stream disconnected");
    });

    rx
}

fn next_payload(code: &str, receiver: &mut watch::Receiver<RoomState>) -> Option<ServerEvent> {
    let payload = {
        let room = receiver.borrow_and_update();
        snapshot_event(code, &room)
    };
    payload
        .inspect_err(|err| warn!(room = %code, error = %err, "failed to serialize room snapshot"))
        .ok()
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::timeout;

    use super::*;
    use crate::{
        config::AppConfig,
        state::{AppState, room::RoomMutation},
    };

    #[test]
    fn snapshot_event_is_named_and_carries_room() {
        let mut room = RoomState::new();
        let (alpha, join) = RoomMutation::join_game("Alpha");
        room.apply(join);
        room.apply(RoomMutation::add_score(alpha, 8));

        let event = snapshot_event("000000", &room).unwrap();
        assert_eq!(event.event.as_deref(), Some("room.snapshot"));

        let decoded: RoomSnapshot = serde_json::from_str(&event.data).unwrap();
        assert_eq!(decoded.code, "000000");
        assert_eq!(decoded.version, 2);
        assert_eq!(decoded.teams[0].id, alpha);
        assert_eq!(decoded.teams[0].total, 8);
    }

    #[tokio::test]
    async fn forwarder_sends_current_snapshot_then_each_change() {
        let state = AppState::new(AppConfig::default());
        let room = state.room("000000").unwrap();
        let mut events = spawn_snapshot_forwarder(&room);

        let first = timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.event.as_deref(), Some("room.snapshot"));
        let decoded: RoomSnapshot = serde_json::from_str(&first.data).unwrap();
        assert_eq!(decoded.version, 0);
        assert!(decoded.teams.is_empty());

        let (alpha, join) = RoomMutation::join_game("Alpha");
        room.store.mutate(join);

        let second = timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.event.as_deref(), Some("room.snapshot"));
        let decoded: RoomSnapshot = serde_json::from_str(&second.data).unwrap();
        assert_eq!(decoded.version, 1);
        assert_eq!(decoded.teams[0].id, alpha);
    }

    #[tokio::test]
    async fn forwarder_releases_subscription_when_client_goes_away() {
        let state = AppState::new(AppConfig::default());
        let room = state.room("000000").unwrap();
        let mut events = spawn_snapshot_forwarder(&room);
        timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(room.store.subscriber_count(), 1);

        drop(events);
        timeout(Duration::from_secs(1), async {
            while room.store.subscriber_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}
