// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Station controller components.
//!
//! Token dispatch, the hardware commit procedure, the deferred timer and
//! the error-recovery policy. `StationMachine` ties them together and is
//! the only writer of station state and of the register bus.

pub mod events;
pub mod executor;
pub mod machine;
pub mod recovery;
pub mod session;
pub mod timer;
pub mod transitions;

pub use events::{ListenerId, StationEventEmitter, StationListener};
pub use executor::{CommitError, Settled, TransitionExecutor};
pub use machine::StationMachine;
pub use session::Session;
pub use timer::{DeferredTimer, StationTiming};
pub use transitions::{propose, Proposal};

#[cfg(test)]
pub(crate) mod testing;
