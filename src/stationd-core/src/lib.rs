// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod station;

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub use station::actuator::{Actuator, ActuatorMask};
pub use station::request::StationRequest;
pub use station::response::{Advisory, StationResult};
pub use station::state::{PrimaryState, StationSnapshot, StationState};
pub use station::token::Token;
pub use station::RegisterBus;
