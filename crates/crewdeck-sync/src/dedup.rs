//! Bounded recent-event memory for duplicate suppression.

use std::collections::{HashSet, VecDeque};

use crewdeck_types::Timestamp;

use crate::protocol::NotificationEvent;

/// Default capacity of the dedup set.
pub const DEFAULT_CAPACITY: usize = 100;

/// Placeholder resource id when an event carries neither task nor project.
const UNKNOWN_RESOURCE: &str = "unknown";

/// Derive the dedup key for an inbound event.
///
/// Key = event type + most specific resource id (task, else project, else a
/// fixed placeholder) + timestamp. When the server omits the timestamp the
/// local receipt time is quantized to whole seconds, so an immediate
/// re-delivery still collides.
pub fn dedup_key(event: &NotificationEvent, received_at: Timestamp) -> String {
    let resource = event
        .task_id
        .as_deref()
        .or(event.project_id.as_deref())
        .unwrap_or(UNKNOWN_RESOURCE);
    let stamp = match event.timestamp {
        Some(ts) => ts.timestamp_millis(),
        None => received_at.timestamp(),
    };
    format!("{}:{}:{}", event.event_type, resource, stamp)
}

/// Bounded ordered set of recently seen dedup keys.
///
/// FIFO eviction at capacity. The bound is a memory limit, not a
/// correctness mechanism: an old duplicate re-accepted after eviction is an
/// acceptable false negative. Scoped to one router instance; reset on full
/// page reload / re-login.
#[derive(Debug)]
pub struct EventDeduplicator {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl EventDeduplicator {
    /// Create a deduplicator with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a deduplicator with an explicit capacity.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        Self {
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Whether `key` is currently protected against re-delivery.
    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Record `key`; returns `false` if it was already present.
    ///
    /// Evicts the oldest entry when the set would exceed capacity.
    pub fn insert(&mut self, key: String) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(key.clone());
        self.order.push_back(key);
        true
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut dedup = EventDeduplicator::new();
        assert!(dedup.insert("TASK_ASSIGNED:t9:1000".into()));
        assert!(!dedup.insert("TASK_ASSIGNED:t9:1000".into()));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn fifo_eviction_at_capacity() {
        let mut dedup = EventDeduplicator::new();
        for i in 0..150 {
            assert!(dedup.insert(format!("key-{}", i)));
        }
        assert_eq!(dedup.len(), 100);

        // The 50 oldest are no longer protected against re-delivery.
        for i in 0..50 {
            assert!(!dedup.contains(&format!("key-{}", i)));
            assert!(dedup.insert(format!("key-{}", i)));
        }
        // The newest 50 of the original batch survived the first pass but
        // have now been pushed out by the re-inserted keys.
        assert_eq!(dedup.len(), 100);
        assert!(dedup.contains("key-149"));
    }

    #[test]
    fn key_prefers_task_over_project() {
        let received = chrono::Utc.timestamp_opt(2_000, 0).unwrap();
        let mut event = NotificationEvent {
            event_type: "TASK_ASSIGNED".into(),
            task_id: Some("t9".into()),
            project_id: Some("p3".into()),
            timestamp: Some(chrono::Utc.timestamp_millis_opt(1000).unwrap()),
            ..Default::default()
        };
        assert_eq!(dedup_key(&event, received), "TASK_ASSIGNED:t9:1000");

        event.task_id = None;
        assert_eq!(dedup_key(&event, received), "TASK_ASSIGNED:p3:1000");

        event.project_id = None;
        assert_eq!(dedup_key(&event, received), "TASK_ASSIGNED:unknown:1000");
    }

    #[test]
    fn missing_timestamp_falls_back_to_receipt_seconds() {
        let event = NotificationEvent {
            event_type: "GENERIC".into(),
            ..Default::default()
        };
        let received = chrono::Utc.timestamp_opt(1_700_000_000, 123_456).unwrap();
        // Sub-second receipt jitter must not defeat deduplication.
        assert_eq!(dedup_key(&event, received), "GENERIC:unknown:1700000000");
    }
}
