//! Connection state machine and room membership bookkeeping.
//!
//! The [`ConnectionManager`] is transport-free: the channel driver feeds it
//! lifecycle signals and it emits join requests into the outbound queue. It
//! never retries the connection itself — reconnection belongs to the
//! transport — but it owns the logical state that must be rebuilt after
//! every reconnect: room membership does not survive a transport drop and
//! is re-established, never assumed, on each transition into `Connected`.

use std::collections::HashSet;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crewdeck_types::{Id, Identity};

use crate::protocol::ClientEvent;

/// Connection state of the realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected; no reconnect pending.
    Disconnected,
    /// Transport is establishing (or re-establishing) the channel.
    Connecting,
    /// Channel is up; room membership is meaningful.
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Lifecycle signals delivered by the channel driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSignal {
    /// An attempt to establish the channel has started.
    Connecting {
        /// Consecutive attempt number, 0 for the first connect.
        attempt: u32,
    },
    /// The channel is up and authenticated.
    Connected,
    /// The channel is down and the driver has stopped retrying.
    Disconnected,
}

/// A logical multicast group the connection subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    /// Per-user room: `user:<id>`.
    User(Id),
    /// Per-tenant room: `tenant:<id>`.
    Tenant(Id),
}

impl Room {
    /// The join request for this room.
    fn join_event(&self) -> ClientEvent {
        match self {
            Room::User(id) => ClientEvent::JoinUser(id.clone()),
            Room::Tenant(id) => ClientEvent::JoinTenant(id.clone()),
        }
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Room::User(id) => write!(f, "user:{}", id),
            Room::Tenant(id) => write!(f, "tenant:{}", id),
        }
    }
}

/// Owns the logical side of one identity's realtime channel.
///
/// Lifecycle: [`open`](Self::open) on login, [`close`](Self::close) on
/// logout or identity switch. Close before opening for a different
/// identity — two identities' channels in one client are disallowed.
pub struct ConnectionManager {
    state: ConnectionState,
    /// Identity rooms to (re)join on every connect.
    identity_rooms: Vec<Room>,
    /// Rooms joined on the current channel instance.
    joined: HashSet<Room>,
    /// Join intents deferred until the channel is connected.
    pending: Vec<Room>,
    /// Outbound queue drained by the channel driver.
    outbound: mpsc::UnboundedSender<ClientEvent>,
}

impl ConnectionManager {
    /// Create a manager that emits join requests into `outbound`.
    pub fn new(outbound: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            identity_rooms: Vec::new(),
            joined: HashSet::new(),
            pending: Vec::new(),
            outbound,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Rooms joined on the current channel instance.
    ///
    /// Meaningful only while [`ConnectionState::Connected`].
    pub fn joined_rooms(&self) -> &HashSet<Room> {
        &self.joined
    }

    /// Register the identity whose rooms this channel subscribes to.
    ///
    /// If the channel is already connected, the join requests are re-issued
    /// immediately — re-invoking `open` with an updated identity on a live
    /// channel must not recreate it. Otherwise the joins are deferred until
    /// the connect acknowledgment; they are never dropped.
    ///
    /// Any bookkeeping for a previously registered identity is discarded
    /// first: deferred intents queued before a reconnect completes must
    /// never join a superseded identity's rooms.
    pub fn open(&mut self, identity: &Identity) {
        self.pending.clear();
        self.joined.clear();
        self.identity_rooms.clear();
        self.identity_rooms.push(Room::User(identity.user_id.clone()));
        if let Some(tenant_id) = &identity.tenant_id {
            self.identity_rooms.push(Room::Tenant(tenant_id.clone()));
        }

        if self.state == ConnectionState::Connected {
            for room in self.identity_rooms.clone() {
                self.issue_join(room);
            }
        } else {
            for room in self.identity_rooms.clone() {
                self.defer_join(room);
            }
        }
    }

    /// Request a room join, deferring it if the channel is not connected.
    pub fn request_join(&mut self, room: Room) {
        if self.state == ConnectionState::Connected {
            if self.joined.contains(&room) {
                debug!(room = %room, "already joined, skipping");
                return;
            }
            self.issue_join(room);
        } else {
            self.defer_join(room);
        }
    }

    /// Handle a server-pushed forced-rejoin directive.
    ///
    /// The join is re-issued unconditionally, even if the room is already
    /// recorded as joined — the directive means the server lost the
    /// membership on its side.
    pub fn force_rejoin_user(&mut self, user_id: Id) {
        let room = Room::User(user_id);
        warn!(room = %room, "forced rejoin directive received");
        if self.state == ConnectionState::Connected {
            self.issue_join(room);
        } else {
            self.defer_join(room);
        }
    }

    /// Apply a lifecycle signal from the channel driver.
    pub fn handle_signal(&mut self, signal: ChannelSignal) {
        match signal {
            ChannelSignal::Connecting { attempt } => {
                debug!(attempt, "channel connecting");
                self.state = ConnectionState::Connecting;
                self.joined.clear();
            }
            ChannelSignal::Connected => {
                self.state = ConnectionState::Connected;
                self.joined.clear();
                // Mandatory on every connect, not just the first: room
                // membership does not survive a transport reconnect.
                for room in self.identity_rooms.clone() {
                    self.defer_join(room);
                }
                let pending = std::mem::take(&mut self.pending);
                for room in pending {
                    if !self.joined.contains(&room) {
                        self.issue_join(room);
                    }
                }
            }
            ChannelSignal::Disconnected => {
                debug!("channel disconnected");
                self.state = ConnectionState::Disconnected;
                self.joined.clear();
            }
        }
    }

    /// Release the channel's logical state.
    ///
    /// Idempotent; a no-op when already closed. Must run on logout and on
    /// identity change, before a channel for a different identity opens.
    pub fn close(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.identity_rooms.clear();
        self.joined.clear();
        self.pending.clear();
    }

    fn issue_join(&mut self, room: Room) {
        debug!(room = %room, "issuing join request");
        if self.outbound.send(room.join_event()).is_err() {
            warn!(room = %room, "outbound channel closed, join request dropped");
            return;
        }
        self.joined.insert(room);
    }

    fn defer_join(&mut self, room: Room) {
        if !self.pending.contains(&room) {
            self.pending.push(room);
        }
    }
}
