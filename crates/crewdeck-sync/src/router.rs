//! Inbound notification routing.
//!
//! Converts a raw inbound event into at most one user-visible notification:
//! targeting filter, self-echo suppression, duplicate suppression, then
//! materialization and alert dispatch.

use tracing::debug;

use crewdeck_types::{now, Identity, Notification, Role, Timestamp};

use crate::alert::{Alert, AlertDispatcher, AlertKind, AlertTarget};
use crate::dedup::{dedup_key, EventDeduplicator};
use crate::protocol::NotificationEvent;

/// Classify an event type into an alert treatment family.
fn classify(event_type: &str) -> AlertKind {
    match event_type {
        "TASK_ASSIGNED" | "PROJECT_ASSIGNED" => AlertKind::Assignment,
        "TASK_STATUS_CHANGED" | "PROJECT_STATUS_CHANGED" => AlertKind::StatusChange,
        "PROJECT_MEMBER_ADDED" | "PROJECT_MEMBER_REMOVED" => AlertKind::MembershipChange,
        "PERMISSIONS_UPDATED" => AlertKind::PermissionChange,
        _ => AlertKind::Generic,
    }
}

/// Routes inbound events into the session's notification list.
///
/// One instance per authenticated session; the dedup memory resets with it
/// on full reload / re-login.
pub struct NotificationRouter {
    identity: Identity,
    dedup: EventDeduplicator,
    /// Most recent first.
    notifications: Vec<Notification>,
    unread: usize,
}

impl NotificationRouter {
    /// Create a router for the given identity.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            dedup: EventDeduplicator::new(),
            notifications: Vec::new(),
            unread: 0,
        }
    }

    /// Notifications, most recent first.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Number of unread notifications.
    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Process one inbound event. Returns the id of the materialized
    /// notification, or `None` if the event was filtered or a duplicate.
    pub fn handle_event(
        &mut self,
        event: NotificationEvent,
        alerts: &mut AlertDispatcher,
    ) -> Option<String> {
        // 1. Targeting: events addressed to someone else are discarded
        //    before they can touch the dedup set.
        if let Some(target) = &event.target_user_id {
            if *target != self.identity.user_id {
                debug!(target = %target, "event targeted at another user, discarding");
                return None;
            }
        }

        // 2. Self-echo: employees are not notified of their own status
        //    changes. EMPLOYEE-only by product policy; do not generalize to
        //    other roles without an explicit product decision.
        if self.is_self_echo(&event) {
            debug!(event_type = %event.event_type, "self-authored echo, discarding");
            return None;
        }

        // 3–4. Duplicate suppression.
        let received_at = now();
        let key = dedup_key(&event, received_at);
        if !self.dedup.insert(key) {
            debug!(event_type = %event.event_type, "duplicate delivery, discarding");
            return None;
        }

        // 5. Materialization, most recent first.
        let notification = self.materialize(event, received_at);
        let id = notification.id.clone();
        let alert = self.build_alert(&notification);
        self.notifications.insert(0, notification);
        self.unread += 1;

        // 6. Alerting.
        alerts.dispatch(alert);
        Some(id)
    }

    /// Mark one notification read. Idempotent; unread never goes negative.
    pub fn mark_as_read(&mut self, id: &str) {
        if let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) {
            if !n.read {
                n.read = true;
                self.unread = self.unread.saturating_sub(1);
            }
        }
    }

    /// Mark every notification read.
    pub fn mark_all_as_read(&mut self) {
        for n in &mut self.notifications {
            n.read = true;
        }
        self.unread = 0;
    }

    /// Dismiss a notification. Permanent for this session.
    pub fn remove_notification(&mut self, id: &str) {
        if let Some(pos) = self.notifications.iter().position(|n| n.id == id) {
            let removed = self.notifications.remove(pos);
            if !removed.read {
                self.unread = self.unread.saturating_sub(1);
            }
        }
    }

    /// A status change the current identity performed itself, while holding
    /// the most restricted role.
    fn is_self_echo(&self, event: &NotificationEvent) -> bool {
        self.identity.role == Role::Employee
            && classify(&event.event_type) == AlertKind::StatusChange
            && event.changed_by.as_deref() == Some(self.identity.user_id.as_str())
    }

    fn materialize(&self, event: NotificationEvent, received_at: Timestamp) -> Notification {
        let title = event
            .title
            .clone()
            .unwrap_or_else(|| default_title(classify(&event.event_type)).to_string());
        let message = event.message.clone().unwrap_or_default();
        let timestamp = event.timestamp.unwrap_or(received_at);

        let mut notification = Notification::new(event.event_type, title, message, timestamp);
        notification.target_user_id = event.target_user_id;
        notification.related_task_id = event.task_id;
        notification.related_project_id = event.project_id;
        notification
    }

    fn build_alert(&self, notification: &Notification) -> Alert {
        // Most specific navigation target available, mirroring the dedup
        // resource preference.
        let target = notification
            .related_task_id
            .clone()
            .map(AlertTarget::Task)
            .or_else(|| notification.related_project_id.clone().map(AlertTarget::Project));

        Alert {
            kind: classify(&notification.event_type),
            title: notification.title.clone(),
            message: notification.message.clone(),
            target,
        }
    }
}

fn default_title(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::Assignment => "New assignment",
        AlertKind::StatusChange => "Status changed",
        AlertKind::MembershipChange => "Project membership changed",
        AlertKind::PermissionChange => "Your permissions changed",
        AlertKind::Generic => "Notification",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::testing::CapturingSink;
    use chrono::TimeZone;

    fn identity(role: Role) -> Identity {
        Identity::new("u1", Some("t1".to_string()), role)
    }

    fn dispatcher() -> (AlertDispatcher, CapturingSink) {
        let sink = CapturingSink::new();
        let mut alerts = AlertDispatcher::new();
        alerts.add_sink(Box::new(sink.clone()));
        (alerts, sink)
    }

    fn assigned_event() -> NotificationEvent {
        NotificationEvent {
            event_type: "TASK_ASSIGNED".into(),
            title: Some("Task assigned".into()),
            message: Some("You were assigned task t9".into()),
            timestamp: Some(chrono::Utc.timestamp_millis_opt(1000).unwrap()),
            target_user_id: Some("u1".into()),
            task_id: Some("t9".into()),
            ..Default::default()
        }
    }

    #[test]
    fn identical_delivery_twice_yields_one_notification_and_one_alert() {
        let (mut alerts, sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));

        assert!(router.handle_event(assigned_event(), &mut alerts).is_some());
        assert!(router.handle_event(assigned_event(), &mut alerts).is_none());

        assert_eq!(router.notifications().len(), 1);
        assert_eq!(router.unread_count(), 1);
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn events_for_other_users_are_discarded() {
        let (mut alerts, sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));

        let mut event = assigned_event();
        event.target_user_id = Some("somebody-else".into());
        assert!(router.handle_event(event.clone(), &mut alerts).is_none());
        assert_eq!(router.notifications().len(), 0);
        assert_eq!(sink.count(), 0);

        // The mistargeted delivery must not have touched the dedup set:
        // the same payload addressed to us still goes through.
        event.target_user_id = Some("u1".into());
        assert!(router.handle_event(event, &mut alerts).is_some());
    }

    #[test]
    fn employee_self_status_change_is_suppressed() {
        let (mut alerts, sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));

        let event = NotificationEvent {
            event_type: "TASK_STATUS_CHANGED".into(),
            task_id: Some("t9".into()),
            changed_by: Some("u1".into()),
            timestamp: Some(chrono::Utc.timestamp_millis_opt(1000).unwrap()),
            ..Default::default()
        };
        assert!(router.handle_event(event, &mut alerts).is_none());
        assert_eq!(router.notifications().len(), 0);
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn manager_self_status_change_is_not_suppressed() {
        let (mut alerts, _sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::ProjectManager));

        let event = NotificationEvent {
            event_type: "TASK_STATUS_CHANGED".into(),
            task_id: Some("t9".into()),
            changed_by: Some("u1".into()),
            timestamp: Some(chrono::Utc.timestamp_millis_opt(1000).unwrap()),
            ..Default::default()
        };
        assert!(router.handle_event(event, &mut alerts).is_some());
        assert_eq!(router.notifications().len(), 1);
    }

    #[test]
    fn employee_self_assignment_is_not_suppressed() {
        // Suppression covers status changes only.
        let (mut alerts, _sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));

        let mut event = assigned_event();
        event.changed_by = Some("u1".into());
        assert!(router.handle_event(event, &mut alerts).is_some());
    }

    #[test]
    fn malformed_event_falls_back_to_generic_alert() {
        let (mut alerts, sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));

        // Missing type, missing both resource ids: still processed, never
        // silently swallowed.
        let event = NotificationEvent::default();
        assert!(router.handle_event(event, &mut alerts).is_some());

        let alert = sink.last().unwrap();
        assert_eq!(alert.kind, AlertKind::Generic);
        assert_eq!(alert.title, "Notification");
        assert!(alert.target.is_none());
        assert_eq!(router.notifications().len(), 1);
    }

    #[test]
    fn alert_carries_most_specific_navigation_target() {
        let (mut alerts, sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));

        let mut event = assigned_event();
        event.project_id = Some("p3".into());
        router.handle_event(event, &mut alerts);
        assert_eq!(sink.last().unwrap().target, Some(AlertTarget::Task("t9".into())));

        let project_event = NotificationEvent {
            event_type: "PROJECT_MEMBER_ADDED".into(),
            project_id: Some("p3".into()),
            timestamp: Some(chrono::Utc.timestamp_millis_opt(2000).unwrap()),
            ..Default::default()
        };
        router.handle_event(project_event, &mut alerts);
        assert_eq!(
            sink.last().unwrap().target,
            Some(AlertTarget::Project("p3".into()))
        );
    }

    #[test]
    fn notifications_are_most_recent_first() {
        let (mut alerts, _sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));

        let mut first = assigned_event();
        first.task_id = Some("t1".into());
        let mut second = assigned_event();
        second.task_id = Some("t2".into());

        router.handle_event(first, &mut alerts);
        router.handle_event(second, &mut alerts);

        assert_eq!(router.notifications()[0].related_task_id.as_deref(), Some("t2"));
        assert_eq!(router.notifications()[1].related_task_id.as_deref(), Some("t1"));
    }

    #[test]
    fn mark_as_read_is_idempotent() {
        let (mut alerts, _sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));
        let id = router.handle_event(assigned_event(), &mut alerts).unwrap();

        assert_eq!(router.unread_count(), 1);
        router.mark_as_read(&id);
        assert_eq!(router.unread_count(), 0);
        assert!(router.notifications()[0].read);

        router.mark_as_read(&id);
        assert_eq!(router.unread_count(), 0);

        router.mark_as_read("no-such-id");
        assert_eq!(router.unread_count(), 0);
    }

    #[test]
    fn mark_all_as_read_clears_unread() {
        let (mut alerts, _sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));
        let mut other = assigned_event();
        other.task_id = Some("t2".into());
        router.handle_event(assigned_event(), &mut alerts);
        router.handle_event(other, &mut alerts);

        router.mark_all_as_read();
        assert_eq!(router.unread_count(), 0);
        assert!(router.notifications().iter().all(|n| n.read));
    }

    #[test]
    fn remove_adjusts_unread_only_for_unread_entries() {
        let (mut alerts, _sink) = dispatcher();
        let mut router = NotificationRouter::new(identity(Role::Employee));
        let first = router.handle_event(assigned_event(), &mut alerts).unwrap();
        let mut other = assigned_event();
        other.task_id = Some("t2".into());
        let second = router.handle_event(other, &mut alerts).unwrap();

        router.mark_as_read(&first);
        assert_eq!(router.unread_count(), 1);

        router.remove_notification(&first);
        assert_eq!(router.unread_count(), 1, "removing a read entry keeps unread");

        router.remove_notification(&second);
        assert_eq!(router.unread_count(), 0);
        assert!(router.notifications().is_empty());
    }
}
