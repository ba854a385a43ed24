// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Register bus doubles for controller tests.

use std::sync::{Arc, Mutex};

use crate::station::actuator::{Actuator, ActuatorMask};
use crate::station::RegisterBus;
use crate::DynResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Set(ActuatorMask),
    Clear(ActuatorMask),
    Read,
    Reset,
}

#[derive(Debug, Default)]
struct Recorded {
    value: u16,
    ops: Vec<BusOp>,
    faulty: bool,
}

/// In-memory latch that records every call. Clones share the same latch,
/// so a test can keep a handle after boxing one into the machine.
#[derive(Debug, Clone, Default)]
pub struct RecordingBus {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: ActuatorMask) -> Self {
        let bus = Self::new();
        bus.inner.lock().unwrap().value = value.bits();
        bus
    }

    pub fn value(&self) -> ActuatorMask {
        ActuatorMask(self.inner.lock().unwrap().value)
    }

    pub fn is_set(&self, actuator: Actuator) -> bool {
        self.value().contains(actuator)
    }

    pub fn ops(&self) -> Vec<BusOp> {
        self.inner.lock().unwrap().ops.clone()
    }

    /// Ops excluding reads.
    pub fn writes(&self) -> Vec<BusOp> {
        self.ops().into_iter().filter(|op| *op != BusOp::Read).collect()
    }

    pub fn clear_ops(&self) {
        self.inner.lock().unwrap().ops.clear();
    }

    /// While faulty every write fails and leaves the latch untouched.
    pub fn set_faulty(&self, faulty: bool) {
        self.inner.lock().unwrap().faulty = faulty;
    }

    fn write(&self, op: BusOp) -> DynResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.faulty {
            return Err("simulated bus fault".into());
        }
        inner.value = match op {
            BusOp::Set(mask) => inner.value | mask.bits(),
            BusOp::Clear(mask) => inner.value & !mask.bits(),
            BusOp::Reset => 0,
            BusOp::Read => inner.value,
        };
        inner.ops.push(op);
        Ok(())
    }
}

impl RegisterBus for RecordingBus {
    fn describe(&self) -> &str {
        "recording bus"
    }

    fn set_bits(&mut self, mask: ActuatorMask) -> DynResult<()> {
        self.write(BusOp::Set(mask))
    }

    fn clear_bits(&mut self, mask: ActuatorMask) -> DynResult<()> {
        self.write(BusOp::Clear(mask))
    }

    fn read_all(&mut self) -> DynResult<ActuatorMask> {
        let mut inner = self.inner.lock().unwrap();
        inner.ops.push(BusOp::Read);
        Ok(ActuatorMask(inner.value))
    }

    fn reset_all(&mut self) -> DynResult<()> {
        self.write(BusOp::Reset)
    }
}
