// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Station state machine.
//!
//! `StationMachine` is the single writer of station state and of the
//! register bus. Token handling is two-phase: `dispatch` stages a proposal
//! from the transition tables, `commit` applies it. Timer expiry enters
//! through `poll_timer`/`on_timer_expiry` on the same owner, so it can never
//! interleave with a half-finished commit.

use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::station::response::{Advisory, StationResult};
use crate::station::state::{StationSnapshot, StationState, TxPhase};
use crate::station::token::Token;
use crate::station::RegisterBus;
use crate::DynResult;

use super::events::StationEventEmitter;
use super::executor::{CommitError, TransitionExecutor};
use super::recovery;
use super::session::Session;
use super::timer::{DeferredTimer, StationTiming};
use super::transitions::{propose, Proposal};

pub struct StationMachine {
    bus: Box<dyn RegisterBus>,
    session: Session,
    timer: DeferredTimer,
    timing: StationTiming,
    emitter: StationEventEmitter,
}

impl StationMachine {
    /// Take ownership of the bus and drive every line low.
    pub fn new(mut bus: Box<dyn RegisterBus>, timing: StationTiming) -> DynResult<Self> {
        bus.reset_all()?;
        info!("Station initialised on {}", bus.describe());
        Ok(Self {
            bus,
            session: Session::new(),
            timer: DeferredTimer::new(),
            timing,
            emitter: StationEventEmitter::new(),
        })
    }

    pub fn state(&self) -> StationState {
        self.session.current()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn timer(&self) -> &DeferredTimer {
        &self.timer
    }

    pub fn timing(&self) -> &StationTiming {
        &self.timing
    }

    pub fn emitter_mut(&mut self) -> &mut StationEventEmitter {
        &mut self.emitter
    }

    /// `(primary, secondary)` display names.
    pub fn status(&self) -> (String, String) {
        let state = self.session.current();
        (state.primary().to_string(), state.secondary_name())
    }

    /// Dispatch and commit one token.
    ///
    /// Queries are answered here and never reach the transition tables.
    pub fn submit_token(&mut self, token: Token) -> StationResult<()> {
        match token {
            Token::Status => return Ok(()),
            t if t.is_query() => return Err(self.advise(recovery::unsupported(t))),
            _ => {}
        }
        let dispatched = self.dispatch(token);
        let committed = self.commit();
        dispatched.and(committed)
    }

    /// Stage the next state for `token`.
    ///
    /// A sequencing anomaly both stages the corrected sub-state and
    /// returns the advisory, so the correction still needs a `commit`.
    pub fn dispatch(&mut self, token: Token) -> StationResult<()> {
        let state = self.session.current();
        self.session.set_pending_token(Some(token));
        debug!("Dispatching {} in {}", token, state);

        match propose(state, token) {
            Proposal::Transition(next) => {
                self.session.propose(next);
                Ok(())
            }
            Proposal::Recover(corrected) => {
                self.session.propose(corrected);
                Err(self.advise(recovery::error_recovery(token, state, corrected)))
            }
            Proposal::Invalid => Err(self.advise(recovery::token_error(token, state))),
            Proposal::CooldownWait => Err(self.advise(recovery::cooldown_wait(token, state))),
        }
    }

    /// Apply the staged proposal, if any.
    ///
    /// The destination becomes authoritative before any register write, so
    /// a bus fault leaves the station in the destination sub-state.
    pub fn commit(&mut self) -> StationResult<()> {
        let Some(target) = self.session.take_proposal() else {
            self.session.set_pending_token(None);
            return Ok(());
        };
        let old = self.session.current();
        debug!("Commit {} -> {}", old, target);
        self.session.begin(target);

        let outcome = TransitionExecutor::new(self.bus.as_mut(), &self.timing).apply(target);
        self.session.set_pending_token(None);
        match outcome {
            Ok(settled) => {
                self.session.settle(settled.state);
                if settled.state == StationState::Init {
                    self.session.clear_error();
                }
                if let Some(duration) = settled.arm {
                    self.arm_timer(settled.state, duration);
                }
                if settled.state != old {
                    info!("Station {} -> {}", old, settled.state);
                }
                self.emitter.notify_state_change(&old, &settled.state);
                Ok(())
            }
            Err(CommitError::Bus(err)) => {
                Err(self.advise(recovery::hardware_fault(target, &*err)))
            }
            Err(CommitError::Unhandled(state)) => Err(self.advise(recovery::state_error(state))),
        }
    }

    /// Fire the deferred transition if its deadline has passed.
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        if !self.timer.take_if_expired(now) {
            return false;
        }
        self.on_timer_expiry();
        true
    }

    /// Forced transition on timer expiry.
    pub fn on_timer_expiry(&mut self) {
        let state = self.session.current();
        match state {
            StationState::SystemPowerOn => {
                info!("Power-on timeout elapsed, entering standby");
                self.session.propose(StationState::Standby);
                // Faults are already logged and recorded by commit.
                let _ = self.commit();
            }
            StationState::Transmit(band, TxPhase::Cooling) => {
                info!("{} PA cooldown complete", band);
                let cooled = StationState::Transmit(band, TxPhase::CooledDown);
                self.session.begin(cooled);
                let mut executor = TransitionExecutor::new(self.bus.as_mut(), &self.timing);
                let released = executor
                    .release_cooldown(band)
                    .and_then(|_| executor.enter_standby());
                if let Err(err) = released {
                    // Held in the cooled-down sub-state; the next token recovers it.
                    self.advise(recovery::hardware_fault(cooled, &*err));
                    return;
                }
                self.session.settle(StationState::Standby);
                info!("Station {} -> {}", state, StationState::Standby);
                self.emitter
                    .notify_state_change(&state, &StationState::Standby);
            }
            _ => recovery::state_warning(state),
        }
    }

    /// Read-only view for operator tooling.
    pub fn snapshot(&mut self) -> StationSnapshot {
        let state = self.session.current();
        let actuators = match self.bus.read_all() {
            Ok(mask) => Some(mask.names().into_iter().map(str::to_string).collect()),
            Err(err) => {
                error!("Failed to read actuator latch: {}", err);
                None
            }
        };
        StationSnapshot {
            primary: state.primary().to_string(),
            secondary: state.secondary_name(),
            actuators,
            timer_remaining_ms: self
                .timer
                .remaining(Instant::now())
                .map(|d| d.as_millis() as u64),
            time_in_state_ms: self
                .session
                .time_in_state()
                .map(|d| d.as_millis() as u64),
            transition_count: self.session.transition_count(),
            last_advisory: self.session.last_error().map(ToString::to_string),
        }
    }

    /// Drive every line low before the bus is released.
    pub fn shutdown(&mut self) -> DynResult<()> {
        info!("Station shutting down from {}", self.session.current());
        self.bus.reset_all()?;
        self.session.settle(StationState::Init);
        Ok(())
    }

    fn arm_timer(&mut self, state: StationState, duration: Duration) {
        info!("Timer armed for {:?} in {}", duration, state);
        self.timer.arm(duration);
        self.emitter.notify_timer_armed(&state, duration);
    }

    fn advise(&mut self, advisory: Advisory) -> Advisory {
        self.session.record_error(advisory.clone());
        self.emitter.notify_advisory(&advisory);
        advisory
    }
}
