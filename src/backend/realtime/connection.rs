/**
 * Channel Connection
 *
 * Per-socket state machine. A connection is created once the socket has
 * authenticated and moves through:
 *
 * ```text
 * Connected --join(own id)--> Joined --disconnect--> Disconnected
 *     \_____________________disconnect_____________________/
 * ```
 *
 * Each connection is owned by its socket task, so its transitions are never
 * concurrent. Replies (`joined`, `error`) go to the connection's own
 * outbound queue.
 */

use thiserror::Error;
use uuid::Uuid;

use super::rooms::{ConnectionId, DeliveryRooms, EventSender};
use crate::shared::event::{ChannelErrorCode, ClientEvent, ServerEvent};
use crate::shared::messaging::DirectMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Authenticated, not in any room
    Connected,
    /// Member of the room of this user
    Joined(Uuid),
    /// Terminal
    Disconnected,
}

/// Protocol misuse on a socket, answered with an `error` event
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("cannot join the room of another user ({requested})")]
    JoinForbidden { requested: Uuid },
    #[error("cannot publish a message sent by another user ({sender})")]
    PublishForbidden { sender: Uuid },
    #[error("connection is already authenticated")]
    AlreadyAuthenticated,
    #[error("connection is closed")]
    Disconnected,
}

impl ChannelError {
    pub fn code(&self) -> ChannelErrorCode {
        match self {
            Self::JoinForbidden { .. } | Self::PublishForbidden { .. } => {
                ChannelErrorCode::Forbidden
            }
            Self::AlreadyAuthenticated | Self::Disconnected => ChannelErrorCode::BadRequest,
        }
    }

    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::error(self.code(), self.to_string())
    }
}

pub struct Connection {
    id: ConnectionId,
    user_id: Uuid,
    state: ConnectionState,
    outbound: EventSender,
    rooms: DeliveryRooms,
}

impl Connection {
    pub fn new(user_id: Uuid, outbound: EventSender, rooms: DeliveryRooms) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            state: ConnectionState::Connected,
            outbound,
            rooms,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Authenticated identity of this connection
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Enter the room of `requested`, which must be this connection's user
    ///
    /// Joining again with the same id changes nothing.
    pub fn join(&mut self, requested: Uuid) -> Result<(), ChannelError> {
        match self.state {
            ConnectionState::Disconnected => return Err(ChannelError::Disconnected),
            ConnectionState::Joined(_) if requested == self.user_id => return Ok(()),
            _ => {}
        }
        if requested != self.user_id {
            tracing::warn!(
                "Connection {} of user {} tried to join room {}",
                self.id,
                self.user_id,
                requested
            );
            return Err(ChannelError::JoinForbidden { requested });
        }

        self.rooms.join(self.user_id, self.id, self.outbound.clone());
        self.state = ConnectionState::Joined(self.user_id);
        tracing::info!("User {} joined (connection {})", self.user_id, self.id);
        Ok(())
    }

    /// Route a stored message to its receiver's room
    ///
    /// Returns the number of connections it was queued for. Nothing is
    /// persisted here.
    pub fn publish(&self, message: &DirectMessage) -> Result<usize, ChannelError> {
        if self.state == ConnectionState::Disconnected {
            return Err(ChannelError::Disconnected);
        }
        if message.sender_id != self.user_id {
            tracing::warn!(
                "Connection {} of user {} tried to publish as {}",
                self.id,
                self.user_id,
                message.sender_id
            );
            return Err(ChannelError::PublishForbidden {
                sender: message.sender_id,
            });
        }

        let delivered = self.rooms.deliver(message);
        tracing::debug!(
            "Message {} routed to {} connection(s) of user {}",
            message.id,
            delivered,
            message.receiver_id
        );
        Ok(delivered)
    }

    /// Leave the room, if any. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if let ConnectionState::Joined(user_id) = self.state {
            self.rooms.leave(user_id, self.id);
        }
        if self.state != ConnectionState::Disconnected {
            tracing::info!("Connection {} of user {} disconnected", self.id, self.user_id);
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Apply one client frame, replying on the outbound queue
    pub fn handle(&mut self, event: ClientEvent) {
        let result = match event {
            ClientEvent::Authenticate { .. } => Err(ChannelError::AlreadyAuthenticated),
            ClientEvent::Join(user_id) => self
                .join(user_id)
                .map(|()| self.send(ServerEvent::joined(user_id))),
            ClientEvent::SendMessage(message) => self.publish(&message).map(|_| ()),
        };

        if let Err(err) = result {
            self.send(err.to_event());
        }
    }

    /// Queue an event for this connection only
    pub fn send(&self, event: ServerEvent) {
        if self.outbound.send(event).is_err() {
            tracing::debug!("Outbound queue of connection {} is closed", self.id);
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}
