// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file support for stationd.
//!
//! Config is loaded from the `[stationd]` section of `stationd.toml`.
//! Default search order:
//! 1. Path specified via `--config` CLI argument
//! 2. `./stationd.toml`
//! 3. `~/.config/stationd/stationd.toml`
//! 4. `/etc/stationd/stationd.toml`

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stationd_app::{ConfigError, ConfigFile};
use stationd_backend::{DEFAULT_I2C_ADDRESS, DEFAULT_I2C_DEVICE};
use stationd_core::station::controller::StationTiming;

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub general: GeneralConfig,
    /// Register bus backend
    pub bus: BusConfig,
    /// Token listener
    pub listen: ListenConfig,
    /// Forced-transition timing
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Backend name ("mcp23017" or "sim")
    pub backend: String,
    /// i2c-dev character device
    pub device: String,
    /// 7-bit expander address
    pub address: u16,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            backend: "mcp23017".to_string(),
            device: DEFAULT_I2C_DEVICE.to_string(),
            address: DEFAULT_I2C_ADDRESS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub enabled: bool,
    /// IP address to listen on
    pub listen: IpAddr,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds in SYS_PWR_ON before falling through to STANDBY
    pub power_on_timeout_secs: u64,
    /// PA cooldown after a transmit shutdown
    pub cooldown_secs: u64,
    /// PTT guard around a polarization flip, in microseconds
    pub guard_interval_us: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let timing = StationTiming::default();
        Self {
            power_on_timeout_secs: timing.power_on_timeout.as_secs(),
            cooldown_secs: timing.cooldown.as_secs(),
            guard_interval_us: timing.guard_interval.as_micros() as u64,
        }
    }
}

impl TimingConfig {
    pub fn to_timing(&self) -> StationTiming {
        StationTiming::new(
            Duration::from_secs(self.power_on_timeout_secs),
            Duration::from_secs(self.cooldown_secs),
            Duration::from_micros(self.guard_interval_us),
        )
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_log_level(self.general.log_level.as_deref())?;

        if self.bus.backend.trim().is_empty() {
            return Err("[bus].backend must not be empty".to_string());
        }
        validate_address(self.bus.address).map_err(|e| format!("[bus].address {}", e))?;

        if self.listen.enabled && self.listen.port == 0 {
            return Err("[listen].port must be > 0 when listener is enabled".to_string());
        }

        if self.timing.power_on_timeout_secs == 0 {
            return Err("[timing].power_on_timeout_secs must be > 0".to_string());
        }
        if self.timing.cooldown_secs == 0 {
            return Err("[timing].cooldown_secs must be > 0".to_string());
        }
        if self.timing.guard_interval_us == 0 {
            return Err("[timing].guard_interval_us must be > 0".to_string());
        }
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        <Self as ConfigFile>::load_from_file(path)
    }

    /// Returns default config if no config file is found.
    pub fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        <Self as ConfigFile>::load_from_default_paths()
    }

    /// Example `stationd.toml`, ready to drop in place.
    pub fn example_toml() -> String {
        let example = ServerConfig {
            general: GeneralConfig {
                log_level: Some("info".to_string()),
            },
            ..Default::default()
        };
        let Ok(section) = toml::Value::try_from(&example) else {
            return String::new();
        };
        let mut root = toml::Table::new();
        root.insert(Self::section_key().to_string(), section);
        toml::to_string_pretty(&root).unwrap_or_default()
    }
}

/// Reserved and 10-bit ranges are not usable by the expander.
pub fn validate_address(address: u16) -> Result<(), String> {
    if !(0x03..=0x77).contains(&address) {
        return Err(format!("{:#04x} out of range 0x03..=0x77", address));
    }
    Ok(())
}

fn validate_log_level(level: Option<&str>) -> Result<(), String> {
    if let Some(level) = level {
        match level {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(format!(
                    "[general].log_level '{}' is invalid (expected one of: trace, debug, info, warn, error)",
                    level
                ))
            }
        }
    }
    Ok(())
}

impl ConfigFile for ServerConfig {
    fn section_key() -> &'static str {
        "stationd"
    }
}
