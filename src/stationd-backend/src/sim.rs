// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Simulated expander for development and testing.
//!
//! Holds the sixteen output lines in memory. No hardware required.

use tracing::debug;

use stationd_core::{ActuatorMask, DynResult, RegisterBus};

pub struct SimulatedExpander {
    latch: ActuatorMask,
    writes: u64,
}

impl SimulatedExpander {
    pub fn new() -> Self {
        Self::with_latch(ActuatorMask::EMPTY)
    }

    /// Start with lines already energized, as after an unclean exit.
    pub fn with_latch(latch: ActuatorMask) -> Self {
        Self { latch, writes: 0 }
    }

    pub fn latch(&self) -> ActuatorMask {
        self.latch
    }

    /// Number of register writes issued since creation.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn store(&mut self, latch: ActuatorMask) {
        self.writes += 1;
        if latch != self.latch {
            debug!("sim latch {} -> {}", self.latch, latch);
        }
        self.latch = latch;
    }
}

impl Default for SimulatedExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimulatedExpander {
    fn describe(&self) -> &str {
        "simulated expander"
    }

    fn set_bits(&mut self, mask: ActuatorMask) -> DynResult<()> {
        self.store(self.latch.with(mask));
        Ok(())
    }

    fn clear_bits(&mut self, mask: ActuatorMask) -> DynResult<()> {
        self.store(self.latch.without(mask));
        Ok(())
    }

    fn read_all(&mut self) -> DynResult<ActuatorMask> {
        Ok(self.latch)
    }

    fn reset_all(&mut self) -> DynResult<()> {
        self.store(ActuatorMask::EMPTY);
        Ok(())
    }
}
