//! Transient alert dispatch.
//!
//! Alerts are the auto-dismissing toasts the dashboard shows for inbound
//! events. The router and the permission handler build [`Alert`]s and hand
//! them to every registered [`AlertSink`]; a sink may render in-app toasts
//! or mirror to an ambient notification capability when the runtime has
//! one granted.

use crewdeck_types::Id;

/// Visual treatment families, selected by event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Assignment,
    StatusChange,
    MembershipChange,
    PermissionChange,
    Generic,
}

/// Navigation target carried by an actionable alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertTarget {
    Task(Id),
    Project(Id),
}

/// A transient, auto-dismissing alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    /// At most one navigation action, present when the event references a
    /// task or project.
    pub target: Option<AlertTarget>,
}

/// Destination for dispatched alerts.
pub trait AlertSink: Send {
    /// Deliver one alert. Implementations must not block.
    fn alert(&mut self, alert: &Alert);
}

/// Fans one alert out to every registered sink.
#[derive(Default)]
pub struct AlertDispatcher {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl AlertDispatcher {
    /// Create a dispatcher with no sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink. Sinks receive alerts in registration order.
    pub fn add_sink(&mut self, sink: Box<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    /// Dispatch one alert to every sink.
    pub fn dispatch(&mut self, alert: Alert) {
        for sink in &mut self.sinks {
            sink.alert(&alert);
        }
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Test sink capturing every dispatched alert.
    #[derive(Clone, Default)]
    pub struct CapturingSink {
        pub alerts: Arc<Mutex<Vec<Alert>>>,
    }

    impl CapturingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self) -> usize {
            self.alerts.lock().unwrap().len()
        }

        pub fn last(&self) -> Option<Alert> {
            self.alerts.lock().unwrap().last().cloned()
        }
    }

    impl AlertSink for CapturingSink {
        fn alert(&mut self, alert: &Alert) {
            self.alerts.lock().unwrap().push(alert.clone());
        }
    }
}
