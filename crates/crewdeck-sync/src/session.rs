//! Per-identity session façade.
//!
//! One [`Session`] owns the whole realtime subsystem for one authenticated
//! identity: the channel driver, the connection manager, the notification
//! router, and the permission handler. Constructing a session for a new
//! identity requires closing the previous one first — two identities'
//! channels in one client instance are disallowed, because overlapping
//! listeners would leak notifications across identities.

use tokio::sync::mpsc;
use tracing::debug;

use crewdeck_config::ClientConfig;
use crewdeck_types::{Action, Error, Identity, Notification, PermissionMatrix, Result};

use crate::alert::{AlertDispatcher, AlertSink};
use crate::connection::{ConnectionManager, ConnectionState};
use crate::permissions::PermissionSyncHandler;
use crate::protocol::ServerEvent;
use crate::router::NotificationRouter;
use crate::transport::{ChannelDriver, ChannelMessage};

/// The realtime session for one authenticated identity.
pub struct Session {
    identity: Identity,
    manager: ConnectionManager,
    router: NotificationRouter,
    permissions: PermissionSyncHandler,
    alerts: AlertDispatcher,
    driver: Option<ChannelDriver>,
    inbound_rx: mpsc::UnboundedReceiver<ChannelMessage>,
    closed: bool,
}

impl Session {
    /// Open the realtime channel for `identity` and return the session.
    ///
    /// `matrix` is the cold-start permission matrix (pass an empty matrix
    /// and call [`reload_permissions`](Self::reload_permissions) if the
    /// fetch has not happened yet — an empty matrix denies everything,
    /// which errs conservative).
    pub fn open(
        identity: Identity,
        config: &ClientConfig,
        matrix: PermissionMatrix,
    ) -> Result<Self> {
        let token = config
            .server
            .resolve_token()
            .ok_or_else(|| Error::Auth("no auth token configured".to_string()))?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let mut manager = ConnectionManager::new(outbound_tx);
        manager.open(&identity);

        let driver = ChannelDriver::spawn(
            &config.server.url,
            token,
            config.reconnect.clone(),
            outbound_rx,
            inbound_tx,
        )?;

        Ok(Self {
            router: NotificationRouter::new(identity.clone()),
            permissions: PermissionSyncHandler::new(identity.clone(), matrix),
            identity,
            manager,
            alerts: AlertDispatcher::new(),
            driver: Some(driver),
            inbound_rx,
            closed: false,
        })
    }

    /// The session's identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Current channel state.
    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Register an alert sink (in-app toasts, ambient mirror, ...).
    pub fn add_alert_sink(&mut self, sink: Box<dyn AlertSink>) {
        self.alerts.add_sink(sink);
    }

    /// Drain and dispatch every queued channel message (non-blocking).
    ///
    /// Call from the UI loop; all handlers run on the caller's thread, so
    /// the single-writer model holds by construction.
    pub fn pump(&mut self) {
        while let Ok(message) = self.inbound_rx.try_recv() {
            self.dispatch(message);
        }
    }

    /// Await and dispatch the next channel message.
    ///
    /// Returns `false` when the channel task has gone away.
    pub async fn process_next(&mut self) -> bool {
        match self.inbound_rx.recv().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, message: ChannelMessage) {
        match message {
            ChannelMessage::Signal(signal) => self.manager.handle_signal(signal),
            ChannelMessage::Event(ServerEvent::Notification(event)) => {
                self.router.handle_event(event, &mut self.alerts);
            }
            ChannelMessage::Event(ServerEvent::PermissionUpdated(event)) => {
                self.permissions.handle_update(event, &mut self.alerts);
            }
            ChannelMessage::Event(ServerEvent::PermissionUpdatedAdmin(event)) => {
                self.permissions.handle_admin_update(event, &mut self.alerts);
            }
            ChannelMessage::Event(ServerEvent::ForceJoinUser(user_id)) => {
                self.manager.force_rejoin_user(user_id);
            }
        }
    }

    /// Notifications, most recent first.
    pub fn notifications(&self) -> &[Notification] {
        self.router.notifications()
    }

    /// Number of unread notifications.
    pub fn unread_count(&self) -> usize {
        self.router.unread_count()
    }

    /// Mark one notification read.
    pub fn mark_as_read(&mut self, id: &str) {
        self.router.mark_as_read(id);
    }

    /// Mark every notification read.
    pub fn mark_all_as_read(&mut self) {
        self.router.mark_all_as_read();
    }

    /// Dismiss a notification.
    pub fn remove_notification(&mut self, id: &str) {
        self.router.remove_notification(id);
    }

    /// Permission lookup against the session's matrix.
    pub fn allows(&self, module: &str, action: Action) -> bool {
        self.permissions.allows(module, action)
    }

    /// Access the permission handler (refresh signals, admin refetch).
    pub fn permissions(&mut self) -> &mut PermissionSyncHandler {
        &mut self.permissions
    }

    /// Reload the permission matrix from the authorization service.
    ///
    /// A failure keeps the prior matrix in effect and is returned for the
    /// UI to surface as a retryable error.
    pub async fn reload_permissions(
        &mut self,
        client: &crewdeck_client::CrewdeckClient,
    ) -> crewdeck_client::Result<()> {
        self.permissions.reload(client).await
    }

    /// Close the channel and release all session state.
    ///
    /// Idempotent. Must run before a session for a different identity
    /// opens; the driver task is aborted synchronously, so no listener of
    /// this identity survives into the next session.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        debug!(user_id = %self.identity.user_id, "closing session");
        if let Some(driver) = self.driver.take() {
            driver.shutdown();
        }
        self.manager.close();
        self.closed = true;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
