/**
 * Delivery Rooms
 *
 * Registry of live connections grouped by user id. A room exists while at
 * least one connection of that user has joined; delivering a message pushes
 * a `receive_message` event onto the outbound queue of every connection in
 * the receiver's room.
 *
 * # Concurrency
 *
 * Rooms live in a sharded `DashMap`, so joins, leaves and deliveries for
 * different users do not contend on one lock. Outbound queues are unbounded
 * and sending never waits on the socket.
 */

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::shared::event::ServerEvent;
use crate::shared::messaging::DirectMessage;

/// Identifies one socket connection
pub type ConnectionId = Uuid;

/// Outbound queue of one connection
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

type RoomMap = DashMap<Uuid, HashMap<ConnectionId, EventSender>>;

#[derive(Clone, Default)]
pub struct DeliveryRooms {
    rooms: Arc<RoomMap>,
}

impl DeliveryRooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a user's room, creating the room if needed
    ///
    /// Returns `false` when the connection was already a member.
    pub fn join(&self, user_id: Uuid, connection_id: ConnectionId, tx: EventSender) -> bool {
        let mut room = self.rooms.entry(user_id).or_default();
        if room.contains_key(&connection_id) {
            return false;
        }
        room.insert(connection_id, tx);
        true
    }

    /// Remove a connection; an emptied room is dropped
    pub fn leave(&self, user_id: Uuid, connection_id: ConnectionId) -> bool {
        match self.rooms.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let removed = entry.get_mut().remove(&connection_id).is_some();
                if entry.get().is_empty() {
                    entry.remove();
                }
                removed
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Route a message to every connection in the receiver's room
    ///
    /// Returns how many connections it was queued for. A missing room
    /// drops the message.
    pub fn deliver(&self, message: &DirectMessage) -> usize {
        let Some(room) = self.rooms.get(&message.receiver_id) else {
            tracing::debug!(
                "No room for user {}, dropping message {}",
                message.receiver_id,
                message.id
            );
            return 0;
        };

        room.values()
            .filter(|tx| tx.send(ServerEvent::ReceiveMessage(message.clone())).is_ok())
            .count()
    }

    /// Number of connections in a user's room
    pub fn room_size(&self, user_id: Uuid) -> usize {
        self.rooms.get(&user_id).map(|room| room.len()).unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Drop handles whose connection task is gone, then empty rooms
    ///
    /// Returns the number of handles removed.
    pub fn cleanup_closed(&self) -> usize {
        let mut removed = 0;
        self.rooms.retain(|_, room| {
            let before = room.len();
            room.retain(|_, tx| !tx.is_closed());
            removed += before - room.len();
            !room.is_empty()
        });
        removed
    }

    /// Run `cleanup_closed` every `period` in the background
    ///
    /// The task only holds a weak reference and ends at the first tick
    /// after the last `DeliveryRooms` clone is dropped.
    pub fn spawn_cleanup(&self, period: Duration) -> JoinHandle<()> {
        let weak: Weak<RoomMap> = Arc::downgrade(&self.rooms);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let Some(rooms) = weak.upgrade() else {
                    tracing::debug!("Room registry dropped, stopping cleanup");
                    break;
                };
                let removed = DeliveryRooms { rooms }.cleanup_closed();
                if removed > 0 {
                    tracing::debug!("Removed {} closed connection handle(s)", removed);
                }
            }
        })
    }
}
