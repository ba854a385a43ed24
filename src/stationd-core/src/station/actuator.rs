// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Logical actuator lines of the RF front-end and their fixed bit layout.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use super::state::Band;

/// One output line of the GPIO expander.
///
/// Discriminants are the bit index on the expander and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Actuator {
    RotatorPower = 0,
    SdrRock = 1,
    VhfPa = 2,
    SdrLime = 3,
    LBandPa = 4,
    UhfPa = 5,
    UhfPtt = 6,
    RxSwap = 7,
    LBandPtt = 8,
    VhfPtt = 9,
    VhfPolarization = 10,
    UhfPolarization = 11,
    UhfKey = 12,
    VhfKey = 13,
    VhfLna = 14,
    UhfLna = 15,
}

impl Actuator {
    pub const ALL: [Actuator; 16] = [
        Actuator::RotatorPower,
        Actuator::SdrRock,
        Actuator::VhfPa,
        Actuator::SdrLime,
        Actuator::LBandPa,
        Actuator::UhfPa,
        Actuator::UhfPtt,
        Actuator::RxSwap,
        Actuator::LBandPtt,
        Actuator::VhfPtt,
        Actuator::VhfPolarization,
        Actuator::UhfPolarization,
        Actuator::UhfKey,
        Actuator::VhfKey,
        Actuator::VhfLna,
        Actuator::UhfLna,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn mask(self) -> ActuatorMask {
        ActuatorMask(1 << self.index())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::RotatorPower => "ROT_PWR",
            Self::SdrRock => "SDR_ROCK",
            Self::VhfPa => "V_PA",
            Self::SdrLime => "SDR_LIME",
            Self::LBandPa => "L_PA",
            Self::UhfPa => "U_PA",
            Self::UhfPtt => "U_PTT",
            Self::RxSwap => "RX_SWAP",
            Self::LBandPtt => "L_PTT",
            Self::VhfPtt => "V_PTT",
            Self::VhfPolarization => "V_POL",
            Self::UhfPolarization => "U_POL",
            Self::UhfKey => "U_KEY",
            Self::VhfKey => "V_KEY",
            Self::VhfLna => "V_LNA",
            Self::UhfLna => "U_LNA",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of actuator lines, laid out exactly like the expander latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActuatorMask(pub u16);

impl ActuatorMask {
    pub const EMPTY: ActuatorMask = ActuatorMask(0);

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, actuator: Actuator) -> bool {
        self.0 & actuator.mask().0 != 0
    }

    pub fn intersects(self, other: ActuatorMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn with(self, other: ActuatorMask) -> ActuatorMask {
        ActuatorMask(self.0 | other.0)
    }

    pub fn without(self, other: ActuatorMask) -> ActuatorMask {
        ActuatorMask(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Actuator> {
        Actuator::ALL.into_iter().filter(move |a| self.contains(*a))
    }

    /// Names of the energized lines in bit order.
    pub fn names(self) -> Vec<&'static str> {
        self.iter().map(Actuator::name).collect()
    }
}

impl From<Actuator> for ActuatorMask {
    fn from(value: Actuator) -> Self {
        value.mask()
    }
}

impl BitOr for ActuatorMask {
    type Output = ActuatorMask;

    fn bitor(self, rhs: ActuatorMask) -> ActuatorMask {
        self.with(rhs)
    }
}

impl BitOr<Actuator> for ActuatorMask {
    type Output = ActuatorMask;

    fn bitor(self, rhs: Actuator) -> ActuatorMask {
        self.with(rhs.mask())
    }
}

impl BitOr for Actuator {
    type Output = ActuatorMask;

    fn bitor(self, rhs: Actuator) -> ActuatorMask {
        self.mask().with(rhs.mask())
    }
}

impl BitOrAssign for ActuatorMask {
    fn bitor_assign(&mut self, rhs: ActuatorMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ActuatorMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        f.write_str(&self.names().join("|"))
    }
}

/// Lines energized when the station leaves `Init`.
pub const SYSTEM_POWER: ActuatorMask = ActuatorMask(
    (1 << Actuator::SdrRock as u16)
        | (1 << Actuator::SdrLime as u16)
        | (1 << Actuator::RotatorPower as u16),
);

/// Every PA enable, PTT and key line. Cleared whenever the station reaches standby.
pub const TRANSMIT_CHAIN: ActuatorMask = ActuatorMask(
    (1 << Actuator::VhfPa as u16)
        | (1 << Actuator::UhfPa as u16)
        | (1 << Actuator::LBandPa as u16)
        | (1 << Actuator::VhfPtt as u16)
        | (1 << Actuator::UhfPtt as u16)
        | (1 << Actuator::LBandPtt as u16)
        | (1 << Actuator::VhfKey as u16)
        | (1 << Actuator::UhfKey as u16),
);

/// Receive-only path: both LNAs on entry.
pub const RECEIVE_ENTRY: ActuatorMask = ActuatorMask(
    (1 << Actuator::UhfLna as u16) | (1 << Actuator::VhfLna as u16),
);

/// Receive-only path teardown.
pub const RECEIVE_SHUTDOWN: ActuatorMask = ActuatorMask(
    (1 << Actuator::UhfPolarization as u16)
        | (1 << Actuator::VhfPolarization as u16)
        | (1 << Actuator::VhfLna as u16)
        | (1 << Actuator::UhfLna as u16)
        | (1 << Actuator::RxSwap as u16),
);

/// Fixed wiring of one transmit band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandWiring {
    pub pa: Actuator,
    pub ptt: Actuator,
    pub key: Option<Actuator>,
    pub polarization: Option<Actuator>,
    /// Lines set when the band's transmit family is entered.
    pub entry: ActuatorMask,
    /// Lines cleared when the band's transmit family shuts down.
    pub shutdown: ActuatorMask,
}

impl BandWiring {
    /// Lines released once the PA cooldown has elapsed.
    pub fn cooldown_release(&self) -> ActuatorMask {
        match self.key {
            Some(key) => self.pa | key,
            None => self.pa.mask(),
        }
    }
}

pub fn wiring(band: Band) -> BandWiring {
    match band {
        Band::Vhf => BandWiring {
            pa: Actuator::VhfPa,
            ptt: Actuator::VhfPtt,
            key: Some(Actuator::VhfKey),
            polarization: Some(Actuator::VhfPolarization),
            entry: Actuator::UhfLna | Actuator::VhfPa | Actuator::VhfKey,
            shutdown: Actuator::UhfLna
                | Actuator::UhfPolarization
                | Actuator::VhfPolarization
                | Actuator::VhfPtt
                | Actuator::RxSwap,
        },
        Band::Uhf => BandWiring {
            pa: Actuator::UhfPa,
            ptt: Actuator::UhfPtt,
            key: Some(Actuator::UhfKey),
            polarization: Some(Actuator::UhfPolarization),
            entry: Actuator::VhfLna | Actuator::UhfPa | Actuator::UhfKey,
            shutdown: Actuator::VhfLna
                | Actuator::VhfPolarization
                | Actuator::UhfPolarization
                | Actuator::UhfPtt
                | Actuator::RxSwap,
        },
        Band::LBand => BandWiring {
            pa: Actuator::LBandPa,
            ptt: Actuator::LBandPtt,
            key: None,
            polarization: None,
            entry: Actuator::UhfLna | Actuator::VhfLna | Actuator::LBandPa,
            shutdown: Actuator::LBandPtt
                | Actuator::UhfPolarization
                | Actuator::VhfPolarization
                | Actuator::VhfLna
                | Actuator::UhfLna
                | Actuator::RxSwap,
        },
    }
}
