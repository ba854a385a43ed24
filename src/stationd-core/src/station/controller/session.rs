// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::time::{Duration, Instant};

use crate::station::response::Advisory;
use crate::station::state::StationState;
use crate::station::token::Token;

/// The single authoritative record of the station.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current: StationState,
    proposed: Option<StationState>,
    pending_token: Option<Token>,
    last_error: Option<Advisory>,
    transition_count: u64,
    last_transition: Option<Instant>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> StationState {
        self.current
    }

    pub fn proposed(&self) -> Option<StationState> {
        self.proposed
    }

    pub fn pending_token(&self) -> Option<Token> {
        self.pending_token
    }

    pub fn last_error(&self) -> Option<&Advisory> {
        self.last_error.as_ref()
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    pub fn time_in_state(&self) -> Option<Duration> {
        self.last_transition.map(|t| t.elapsed())
    }

    pub(crate) fn set_pending_token(&mut self, token: Option<Token>) {
        self.pending_token = token;
    }

    pub(crate) fn propose(&mut self, next: StationState) {
        self.proposed = Some(next);
    }

    pub(crate) fn take_proposal(&mut self) -> Option<StationState> {
        self.proposed.take()
    }

    /// Make `target` authoritative at the start of a commit.
    pub(crate) fn begin(&mut self, target: StationState) {
        self.current = target;
        self.transition_count += 1;
        self.last_transition = Some(Instant::now());
    }

    /// Record the resting state reached by a commit.
    pub(crate) fn settle(&mut self, state: StationState) {
        self.current = state;
    }

    pub(crate) fn record_error(&mut self, advisory: Advisory) {
        self.last_error = Some(advisory);
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }
}
