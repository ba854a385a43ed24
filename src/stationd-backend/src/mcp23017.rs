// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! MCP23017 GPIO expander on a Linux i2c-dev bus.
//!
//! Port A carries actuator lines 0-7, port B lines 8-15. The chip is used
//! in its power-on register layout (IOCON.BANK = 0, sequential addressing),
//! so both output latches are read and written in one transfer.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;

use tracing::info;

use stationd_core::{ActuatorMask, DynResult, RegisterBus};

/// `I2C_SLAVE` request from `linux/i2c-dev.h`.
const I2C_SLAVE: u64 = 0x0703;

const IODIRA: u8 = 0x00;
const OLATA: u8 = 0x14;

pub struct Mcp23017 {
    file: File,
    description: String,
}

impl Mcp23017 {
    /// Open `device`, select the expander and drive both ports as outputs.
    pub fn open(device: &str, address: u16) -> DynResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(device)
            .map_err(|e| format!("failed to open {}: {}", device, e))?;

        let rc = unsafe {
            libc::ioctl(
                file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(address),
            )
        };
        if rc < 0 {
            return Err(format!(
                "failed to select i2c address {:#04x} on {}: {}",
                address,
                device,
                io::Error::last_os_error()
            )
            .into());
        }

        let mut expander = Self {
            file,
            description: format!("MCP23017 at {:#04x} on {}", address, device),
        };
        // Latch low before the direction switch so no line glitches high.
        expander.write_latch(ActuatorMask::EMPTY)?;
        expander.write_pair(IODIRA, 0x0000)?;
        info!("{} configured, all lines outputs", expander.description);
        Ok(expander)
    }

    fn write_pair(&mut self, register: u8, value: u16) -> io::Result<()> {
        let [low, high] = value.to_le_bytes();
        self.file.write_all(&[register, low, high])
    }

    fn read_pair(&mut self, register: u8) -> io::Result<u16> {
        self.file.write_all(&[register])?;
        let mut buf = [0u8; 2];
        self.file.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_latch(&mut self) -> io::Result<ActuatorMask> {
        self.read_pair(OLATA).map(ActuatorMask)
    }

    fn write_latch(&mut self, latch: ActuatorMask) -> io::Result<()> {
        self.write_pair(OLATA, latch.bits())
    }
}

impl RegisterBus for Mcp23017 {
    fn describe(&self) -> &str {
        &self.description
    }

    fn set_bits(&mut self, mask: ActuatorMask) -> DynResult<()> {
        let latch = self.read_latch()?;
        self.write_latch(latch.with(mask))?;
        Ok(())
    }

    fn clear_bits(&mut self, mask: ActuatorMask) -> DynResult<()> {
        let latch = self.read_latch()?;
        self.write_latch(latch.without(mask))?;
        Ok(())
    }

    fn read_all(&mut self) -> DynResult<ActuatorMask> {
        Ok(self.read_latch()?)
    }

    fn reset_all(&mut self) -> DynResult<()> {
        self.write_latch(ActuatorMask::EMPTY)?;
        Ok(())
    }
}
