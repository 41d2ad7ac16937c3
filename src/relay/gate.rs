//! Notification gate
//!
//! Per-connection subscription state for the input report characteristic.
//! Mutated only by explicit subscribe/unsubscribe lifecycle events from the
//! BLE layer, read by the executor after each response is produced. Pure
//! state holder, failure free.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Connection identifier assigned by the BLE connection loop
pub type ConnectionId = u16;

#[derive(Clone, Copy)]
struct Subscription {
    enabled: bool,
    connection: Option<ConnectionId>,
}

pub struct NotificationGate {
    state: Mutex<CriticalSectionRawMutex, Cell<Subscription>>,
}

impl NotificationGate {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(Subscription {
                enabled: false,
                connection: None,
            })),
        }
    }

    /// Record a subscription change for a connection.
    /// Takes effect for the next publish cycle, never retroactively.
    pub fn set(&self, connection: ConnectionId, enabled: bool) {
        self.state.lock(|cell| {
            cell.set(Subscription {
                enabled,
                connection: Some(connection),
            });
        });
    }

    /// Whether a notification should be pushed to this connection
    pub fn should_notify(&self, connection: ConnectionId) -> bool {
        self.state.lock(|cell| {
            let sub = cell.get();
            sub.enabled && sub.connection == Some(connection)
        })
    }

    /// Whether any connection is currently subscribed
    pub fn is_enabled(&self) -> bool {
        self.state.lock(|cell| cell.get().enabled)
    }

    /// Connection that last changed subscription state, if any
    pub fn connection(&self) -> Option<ConnectionId> {
        self.state.lock(|cell| cell.get().connection)
    }
}

impl Default for NotificationGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disabled() {
        let gate = NotificationGate::new();
        assert!(!gate.is_enabled());
        assert!(!gate.should_notify(0));
        assert_eq!(gate.connection(), None);
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        let gate = NotificationGate::new();

        gate.set(3, true);
        assert!(gate.is_enabled());
        assert!(gate.should_notify(3));
        assert!(!gate.should_notify(4));

        gate.set(3, false);
        assert!(!gate.is_enabled());
        assert!(!gate.should_notify(3));
        // Connection identity is retained across unsubscribe
        assert_eq!(gate.connection(), Some(3));
    }

    #[test]
    fn test_new_connection_replaces_old() {
        let gate = NotificationGate::new();

        gate.set(1, true);
        gate.set(2, true);
        assert!(!gate.should_notify(1));
        assert!(gate.should_notify(2));
    }
}
