// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Station event notification.
//!
//! Listeners observe committed transitions, timer arming and advisories
//! without being able to influence the machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::station::response::Advisory;
use crate::station::state::StationState;

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Trait for components that want to receive station events.
///
/// All methods have default no-op implementations, so listeners can
/// selectively override only the events they care about.
pub trait StationListener: Send + Sync {
    /// Called after a commit or timer expiry settled the station in `new`.
    fn on_state_change(&self, _old: &StationState, _new: &StationState) {}

    /// Called when the deferred timer is armed.
    fn on_timer_armed(&self, _state: &StationState, _duration: Duration) {}

    /// Called when a token or timer expiry produced an advisory.
    fn on_advisory(&self, _advisory: &Advisory) {}
}

/// Manages registered listeners and dispatches events.
pub struct StationEventEmitter {
    listeners: Vec<(ListenerId, Arc<dyn StationListener>)>,
}

impl Default for StationEventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl StationEventEmitter {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener. The returned ID can be used to unregister it.
    pub fn register(&mut self, listener: Arc<dyn StationListener>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push((id, listener));
        id
    }

    pub fn unregister(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn notify_state_change(&self, old: &StationState, new: &StationState) {
        for (_, listener) in &self.listeners {
            listener.on_state_change(old, new);
        }
    }

    pub fn notify_timer_armed(&self, state: &StationState, duration: Duration) {
        for (_, listener) in &self.listeners {
            listener.on_timer_armed(state, duration);
        }
    }

    pub fn notify_advisory(&self, advisory: &Advisory) {
        for (_, listener) in &self.listeners {
            listener.on_advisory(advisory);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    struct TestListener {
        changed: AtomicBool,
        advised: AtomicBool,
    }

    impl TestListener {
        fn new() -> Self {
            Self {
                changed: AtomicBool::new(false),
                advised: AtomicBool::new(false),
            }
        }
    }

    impl StationListener for TestListener {
        fn on_state_change(&self, _old: &StationState, _new: &StationState) {
            self.changed.store(true, Ordering::Relaxed);
        }

        fn on_advisory(&self, _advisory: &Advisory) {
            self.advised.store(true, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_register_and_notify() {
        let mut emitter = StationEventEmitter::new();
        let listener = Arc::new(TestListener::new());
        let id = emitter.register(listener.clone());
        assert_eq!(emitter.listener_count(), 1);

        emitter.notify_state_change(&StationState::Init, &StationState::SystemPowerOn);
        assert!(listener.changed.load(Ordering::Relaxed));
        assert!(!listener.advised.load(Ordering::Relaxed));

        emitter.notify_advisory(&Advisory::CooldownBusy {
            state: "V_TRAN:V_PA_COOL".into(),
        });
        assert!(listener.advised.load(Ordering::Relaxed));

        emitter.unregister(id);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_timer_event_is_optional() {
        let mut emitter = StationEventEmitter::new();
        let listener = Arc::new(TestListener::new());
        emitter.register(listener.clone());

        emitter.notify_timer_armed(&StationState::SystemPowerOn, Duration::from_secs(60));
        assert!(!listener.changed.load(Ordering::Relaxed));
    }
}
