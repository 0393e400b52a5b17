//! End-to-end flow across the connection manager, router, and permission
//! handler, driven without a live socket.

use std::sync::{Arc, Mutex};

use chrono::TimeZone;
use tokio::sync::mpsc;

use crewdeck_sync::{
    Alert, AlertDispatcher, AlertSink, ChannelSignal, ClientEvent, ConnectionManager,
    ConnectionState, NotificationEvent, NotificationRouter, PermissionSyncHandler,
    PermissionUpdatedEvent,
};
use crewdeck_types::{Action, Identity, PermissionMatrix, Role};

#[derive(Clone, Default)]
struct RecordingSink {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl AlertSink for RecordingSink {
    fn alert(&mut self, alert: &Alert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn employee_connects_joins_and_reads_a_notification() {
    let identity = Identity::new("u1", Some("t1".to_string()), Role::Employee);

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let mut manager = ConnectionManager::new(outbound_tx);
    let mut router = NotificationRouter::new(identity.clone());
    let sink = RecordingSink::default();
    let mut alerts = AlertDispatcher::new();
    alerts.add_sink(Box::new(sink.clone()));

    // Connect: the identity's rooms are joined once the channel is up.
    manager.open(&identity);
    manager.handle_signal(ChannelSignal::Connecting { attempt: 0 });
    manager.handle_signal(ChannelSignal::Connected);
    assert_eq!(manager.state(), ConnectionState::Connected);
    let joins = drain(&mut outbound_rx);
    assert!(joins.contains(&ClientEvent::JoinUser("u1".into())));
    assert!(joins.contains(&ClientEvent::JoinTenant("t1".into())));

    // Inbound assignment targeted at this user.
    let event = NotificationEvent {
        event_type: "TASK_ASSIGNED".into(),
        title: Some("Task assigned".into()),
        message: Some("You were assigned t9".into()),
        timestamp: Some(chrono::Utc.timestamp_millis_opt(1000).unwrap()),
        target_user_id: Some("u1".into()),
        task_id: Some("t9".into()),
        ..Default::default()
    };
    let id = router.handle_event(event, &mut alerts).expect("one notification");

    assert_eq!(router.notifications().len(), 1);
    assert!(!router.notifications()[0].read);
    assert_eq!(router.unread_count(), 1);
    assert_eq!(sink.alerts.lock().unwrap().len(), 1);

    router.mark_as_read(&id);
    assert!(router.notifications()[0].read);
    assert_eq!(router.unread_count(), 0);
}

#[test]
fn pushed_permissions_change_what_the_engine_would_gate() {
    let identity = Identity::new("u1", Some("t1".to_string()), Role::Employee);
    let initial = PermissionMatrix::from_entries([("manageTasks", Action::Read, true)]);
    let mut handler = PermissionSyncHandler::new(identity.clone(), initial);
    let mut alerts = AlertDispatcher::new();

    assert!(!handler.allows("manageTasks", Action::Update));

    handler.handle_update(
        PermissionUpdatedEvent {
            user_id: "u1".into(),
            permissions: PermissionMatrix::from_entries([
                ("manageTasks", Action::Read, true),
                ("manageTasks", Action::Update, true),
            ]),
            updated_by: Some("Avery Admin".into()),
        },
        &mut alerts,
    );

    assert!(handler.allows("manageTasks", Action::Update));
    assert!(handler.refresh_needed());

    // Role-based coarse gates are independent of the pushed matrix: an
    // employee still cannot reach the task-management feature area.
    assert!(!crewdeck_authz::can_manage_tasks(Some(&identity)));
    assert!(crewdeck_authz::can_do_tenant_work(Some(&identity)));
}

#[test]
fn identity_switch_never_leaks_the_old_identity_rooms() {
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let mut manager = ConnectionManager::new(outbound_tx);

    let alice = Identity::new("alice", Some("t1".to_string()), Role::Employee);
    manager.open(&alice);
    manager.handle_signal(ChannelSignal::Connected);
    drain(&mut outbound_rx);

    // Logout: close before the next identity opens.
    manager.close();

    let bob = Identity::new("bob", Some("t2".to_string()), Role::ProjectManager);
    manager.open(&bob);
    manager.handle_signal(ChannelSignal::Connecting { attempt: 0 });
    manager.handle_signal(ChannelSignal::Connected);

    let joins = drain(&mut outbound_rx);
    assert_eq!(
        joins,
        vec![
            ClientEvent::JoinUser("bob".into()),
            ClientEvent::JoinTenant("t2".into()),
        ],
        "no join for the previous identity may survive the switch"
    );
}
