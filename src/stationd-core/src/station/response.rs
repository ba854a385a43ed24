// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use serde::Serialize;
use thiserror::Error;

use super::token::Token;

/// Why a token did not produce the transition it asked for.
///
/// Every variant is recoverable by the operator; `Kill` clears all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Token is not legal in the current state. Nothing changed.
    #[error("token {token} not valid in state {state}; no action taken")]
    TokenInvalid { token: Token, state: String },

    /// An action sub-state was still pending when a token arrived.
    /// The family was forced back to its switch sub-state and the token dropped.
    #[error("station should not have been in {state}; corrected to {corrected}, re-enter {token} and verify")]
    SequencingAnomaly {
        token: Token,
        state: String,
        corrected: String,
    },

    /// A transmit chain is cooling down; tokens are ignored until the timer fires.
    #[error("waiting for PA cooldown in {state}; no action taken, KILL forces exit")]
    CooldownBusy { state: String },

    /// The executor reached a sub-state it has no hardware procedure for.
    #[error("program error: no commit procedure for {state}; results unpredictable, KILL and start over")]
    Inconsistent { state: String },

    /// A register write failed part-way through a commit.
    #[error("hardware fault while entering {state}: {message}")]
    Hardware { state: String, message: String },

    /// Telemetry queries are not served by this daemon.
    #[error("{token} not supported")]
    Unsupported { token: Token },
}

impl Advisory {
    /// Short machine-friendly category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenInvalid { .. } => "token_invalid",
            Self::SequencingAnomaly { .. } => "sequencing_anomaly",
            Self::CooldownBusy { .. } => "cooldown_busy",
            Self::Inconsistent { .. } => "inconsistent",
            Self::Hardware { .. } => "hardware",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

pub type StationResult<T> = Result<T, Advisory>;
