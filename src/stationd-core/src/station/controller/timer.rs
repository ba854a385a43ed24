// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Timing policy and the single deferred transition timer.
//!
//! The timer does not run anything by itself. The owner of the
//! `StationMachine` waits for `deadline()` on the same task that processes
//! tokens and then calls `StationMachine::poll_timer`, so timer-driven
//! transitions are serialized with token commits.

use std::time::{Duration, Instant};

/// Durations driving the forced transitions and the polarization guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationTiming {
    /// `SystemPowerOn` falls through to `Standby` after this long.
    pub power_on_timeout: Duration,
    /// Mandatory PA cooldown after a transmit family shuts down.
    pub cooldown: Duration,
    /// Settling time around a polarization relay flip while keying is held off.
    pub guard_interval: Duration,
}

impl StationTiming {
    pub fn new(power_on_timeout: Duration, cooldown: Duration, guard_interval: Duration) -> Self {
        Self {
            power_on_timeout,
            cooldown,
            guard_interval,
        }
    }
}

impl Default for StationTiming {
    fn default() -> Self {
        Self {
            power_on_timeout: Duration::from_secs(60),
            cooldown: Duration::from_secs(120),
            guard_interval: Duration::from_micros(100),
        }
    }
}

/// One-shot countdown with a single pending deadline.
///
/// Arming always replaces whatever was pending; there is no queue.
#[derive(Debug, Clone, Default)]
pub struct DeferredTimer {
    deadline: Option<Instant>,
    armed_for: Option<Duration>,
    generation: u64,
}

impl DeferredTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `duration` from now.
    pub fn arm(&mut self, duration: Duration) {
        self.arm_at(Instant::now(), duration);
    }

    pub fn arm_at(&mut self, now: Instant, duration: Duration) {
        self.deadline = Some(now + duration);
        self.armed_for = Some(duration);
        self.generation += 1;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Duration passed to the most recent `arm` call while still pending.
    pub fn armed_for(&self) -> Option<Duration> {
        self.deadline.and(self.armed_for)
    }

    /// Incremented on every arm, lets waiters notice a replaced deadline.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Disarm and report `true` if the deadline has passed.
    pub fn take_if_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
