// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use crate::DynResult;

pub mod actuator;
pub mod controller;
pub mod request;
pub mod response;
pub mod state;
pub mod token;

use actuator::{Actuator, ActuatorMask};

/// Register-level contract of the GPIO expander driving the RF front-end.
///
/// Every operation addresses the fixed sixteen-line actuator register.
/// Implementations must apply each call atomically with respect to the
/// other lines: `set_bits` never disturbs bits outside the mask.
pub trait RegisterBus: Send {
    /// Short human-readable description used in startup logs.
    fn describe(&self) -> &str;

    fn set_bits(&mut self, mask: ActuatorMask) -> DynResult<()>;

    fn clear_bits(&mut self, mask: ActuatorMask) -> DynResult<()>;

    fn set_bit(&mut self, actuator: Actuator) -> DynResult<()> {
        self.set_bits(actuator.mask())
    }

    fn clear_bit(&mut self, actuator: Actuator) -> DynResult<()> {
        self.clear_bits(actuator.mask())
    }

    fn read_bit(&mut self, actuator: Actuator) -> DynResult<bool> {
        Ok(self.read_all()?.contains(actuator))
    }

    /// Read back the whole output latch.
    fn read_all(&mut self) -> DynResult<ActuatorMask>;

    /// Drive every line low.
    fn reset_all(&mut self) -> DynResult<()>;
}
