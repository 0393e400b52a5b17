//! Realtime synchronization subsystem for the Crewdeck dashboard.
//!
//! Keeps notifications and permission state consistent with server-pushed
//! changes across reconnects:
//!
//! - [`connection::ConnectionManager`] — connection state machine and room
//!   membership, rebuilt on every reconnect.
//! - [`transport::ChannelDriver`] — WebSocket driver with backoff; the only
//!   component that touches the network.
//! - [`dedup::EventDeduplicator`] — bounded recent-event memory.
//! - [`router::NotificationRouter`] — inbound events to user-visible
//!   notifications and alerts.
//! - [`permissions::PermissionSyncHandler`] — server-pushed permission
//!   changes into the local matrix, wholesale.
//! - [`session::Session`] — one façade per authenticated identity.
//!
//! Everything runs on the caller's task: the driver feeds queues, the
//! session drains them, and no handler blocks or spawns workers.

pub mod alert;
pub mod connection;
pub mod dedup;
pub mod permissions;
pub mod protocol;
pub mod router;
pub mod session;
pub mod transport;

pub use alert::{Alert, AlertDispatcher, AlertKind, AlertSink, AlertTarget};
pub use connection::{ChannelSignal, ConnectionManager, ConnectionState, Room};
pub use dedup::{dedup_key, EventDeduplicator};
pub use permissions::PermissionSyncHandler;
pub use protocol::{
    AffectedUser, ClientEvent, NotificationEvent, PermissionUpdatedAdminEvent,
    PermissionUpdatedEvent, ServerEvent,
};
pub use router::NotificationRouter;
pub use session::Session;
pub use transport::{ChannelDriver, ChannelMessage};
