// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Failure policies: classify, log, and build the advisory handed back to
//! the operator. None of these touch state or hardware.

use tracing::{error, warn};

use crate::station::response::Advisory;
use crate::station::state::StationState;
use crate::station::token::Token;

/// Token not legal in the current state. Nothing changes.
pub fn token_error(token: Token, state: StationState) -> Advisory {
    warn!(
        "Token {} not valid in state {}, no action taken, check token sequencing",
        token, state
    );
    Advisory::TokenInvalid {
        token,
        state: state.to_string(),
    }
}

/// An action sub-state was found persisting; the caller stages `corrected`.
pub fn error_recovery(token: Token, state: StationState, corrected: StationState) -> Advisory {
    warn!(
        "Station should not be in {} when {} arrives, corrective action: forcing {}, re-enter {} and verify",
        state, token, corrected, token
    );
    Advisory::SequencingAnomaly {
        token,
        state: state.to_string(),
        corrected: corrected.to_string(),
    }
}

pub fn cooldown_wait(token: Token, state: StationState) -> Advisory {
    warn!(
        "Token {} received in {}, waiting for PA cooldown, no action taken",
        token, state
    );
    Advisory::CooldownBusy {
        state: state.to_string(),
    }
}

/// The executor has no procedure for `state`. No automatic correction.
pub fn state_error(state: StationState) -> Advisory {
    error!(
        "Program error: no commit procedure for {}, results unpredictable, KILL and start over",
        state
    );
    Advisory::Inconsistent {
        state: state.to_string(),
    }
}

pub fn hardware_fault(state: StationState, err: &dyn std::error::Error) -> Advisory {
    error!("Register bus failure while entering {}: {}", state, err);
    Advisory::Hardware {
        state: state.to_string(),
        message: err.to_string(),
    }
}

/// Timer fired with nothing to force. Advisory only.
pub fn state_warning(state: StationState) {
    warn!(
        "Timer expired in unexpected state {}, KILL token likely entered before, no action taken",
        state
    );
}

pub fn unsupported(token: Token) -> Advisory {
    warn!("Query {} not supported", token);
    Advisory::Unsupported { token }
}
