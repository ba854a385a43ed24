// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::collections::HashMap;

use stationd_app::normalize_name;
use stationd_core::{DynResult, RegisterBus};

#[cfg(target_os = "linux")]
mod mcp23017;
mod sim;

#[cfg(target_os = "linux")]
pub use mcp23017::Mcp23017;
pub use sim::SimulatedExpander;

/// Default expander address on the station bus.
pub const DEFAULT_I2C_ADDRESS: u16 = 0x20;
pub const DEFAULT_I2C_DEVICE: &str = "/dev/i2c-1";

/// How to reach the register bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusAccess {
    /// Backend needs no device (simulation).
    None,
    I2c { device: String, address: u16 },
}

pub type BackendFactory = fn(BusAccess) -> DynResult<Box<dyn RegisterBus>>;

/// Named register bus factories.
#[derive(Clone)]
pub struct RegistrationContext {
    factories: HashMap<String, BackendFactory>,
}

impl RegistrationContext {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory under a stable name (e.g. "mcp23017").
    pub fn register_backend(&mut self, name: &str, factory: BackendFactory) {
        self.factories.insert(normalize_name(name), factory);
    }

    pub fn is_backend_registered(&self, name: &str) -> bool {
        self.factories.contains_key(&normalize_name(name))
    }

    /// Registered names, sorted.
    pub fn registered_backends(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Open the named backend.
    pub fn build_bus(&self, name: &str, access: BusAccess) -> DynResult<Box<dyn RegisterBus>> {
        let factory = self
            .factories
            .get(&normalize_name(name))
            .ok_or_else(|| format!("Unknown bus backend: {}", name))?;
        factory(access)
    }
}

impl Default for RegistrationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Register all built-in backends on a context.
pub fn register_builtin_backends_on(context: &mut RegistrationContext) {
    context.register_backend("sim", sim_factory);
    #[cfg(target_os = "linux")]
    context.register_backend("mcp23017", mcp23017_factory);
}

fn sim_factory(_access: BusAccess) -> DynResult<Box<dyn RegisterBus>> {
    Ok(Box::new(SimulatedExpander::new()))
}

#[cfg(target_os = "linux")]
fn mcp23017_factory(access: BusAccess) -> DynResult<Box<dyn RegisterBus>> {
    match access {
        BusAccess::I2c { device, address } => Ok(Box::new(Mcp23017::open(&device, address)?)),
        BusAccess::None => Err("mcp23017 backend requires an i2c device".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stationd_core::Actuator;

    fn context() -> RegistrationContext {
        let mut context = RegistrationContext::new();
        register_builtin_backends_on(&mut context);
        context
    }

    #[test]
    fn test_builtin_names_are_normalized() {
        let context = context();
        assert!(context.is_backend_registered("sim"));
        assert!(context.is_backend_registered("SIM"));
        #[cfg(target_os = "linux")]
        assert!(context.is_backend_registered("MCP-23017"));
        assert!(!context.is_backend_registered("ft817"));
    }

    #[test]
    fn test_build_sim_bus() {
        let mut bus = context().build_bus("sim", BusAccess::None).unwrap();
        bus.set_bit(Actuator::RxSwap).unwrap();
        assert!(bus.read_bit(Actuator::RxSwap).unwrap());
    }

    #[test]
    fn test_unknown_backend() {
        let err = context()
            .build_bus("pcf8574", BusAccess::None)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Unknown bus backend: pcf8574");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_mcp23017_requires_device() {
        assert!(context().build_bus("mcp23017", BusAccess::None).is_err());
    }
}
