// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Station state model.
//!
//! The authoritative state is a sum type: each primary state carries only
//! the secondary sub-states that belong to its family, so a transmit
//! sub-state can never be paired with the receive path or with `Standby`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// RF band served by a transmit chain or a polarization relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Vhf,
    Uhf,
    LBand,
}

impl Band {
    /// Single-letter prefix used in state and token names.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Vhf => "V",
            Self::Uhf => "U",
            Self::LBand => "L",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Vhf => "VHF",
            Self::Uhf => "UHF",
            Self::LBand => "L-band",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Circular polarization selected by a band's polarization relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    /// LHCP, relay energized.
    Left,
    /// RHCP, relay released.
    Right,
}

impl Polarization {
    fn suffix(self) -> &'static str {
        match self {
            Self::Left => "LHCP",
            Self::Right => "RHCP",
        }
    }
}

/// Transient action sub-state shared by all families.
///
/// An action is applied once by the executor and the family immediately
/// falls back to its switch sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SwapOn,
    SwapOff,
    Polarize(Band, Polarization),
    KeyOn,
    KeyOff,
}

/// Secondary states of the receive-only family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RxPhase {
    Receive,
    Switch,
    Shutdown,
    Action(Action),
}

/// Secondary states of a transmit family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxPhase {
    /// Entry: energize the chain, then settle in `Switch`.
    Transmit,
    Switch,
    Shutdown,
    Cooling,
    CooledDown,
    Action(Action),
}

/// Top-level operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryState {
    Init,
    SystemPowerOn,
    Standby,
    ReceiveOnly,
    VhfTransmit,
    UhfTransmit,
    LBandTransmit,
}

impl PrimaryState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::SystemPowerOn => "SYS_PWR_ON",
            Self::Standby => "STANDBY",
            Self::ReceiveOnly => "RX_ONLY",
            Self::VhfTransmit => "V_TRAN",
            Self::UhfTransmit => "U_TRAN",
            Self::LBandTransmit => "L_TRAN",
        }
    }

    pub fn transmit(band: Band) -> Self {
        match band {
            Band::Vhf => Self::VhfTransmit,
            Band::Uhf => Self::UhfTransmit,
            Band::LBand => Self::LBandTransmit,
        }
    }
}

impl fmt::Display for PrimaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete (primary, secondary) state of the station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StationState {
    #[default]
    Init,
    SystemPowerOn,
    Standby,
    ReceiveOnly(RxPhase),
    Transmit(Band, TxPhase),
}

impl StationState {
    pub fn primary(&self) -> PrimaryState {
        match self {
            Self::Init => PrimaryState::Init,
            Self::SystemPowerOn => PrimaryState::SystemPowerOn,
            Self::Standby => PrimaryState::Standby,
            Self::ReceiveOnly(_) => PrimaryState::ReceiveOnly,
            Self::Transmit(band, _) => PrimaryState::transmit(*band),
        }
    }

    /// Display name of the secondary state (`NONE` outside a family).
    pub fn secondary_name(&self) -> String {
        match self {
            Self::Init | Self::SystemPowerOn | Self::Standby => "NONE".to_string(),
            Self::ReceiveOnly(phase) => rx_phase_name(*phase),
            Self::Transmit(band, phase) => tx_phase_name(*band, *phase),
        }
    }

    /// Resting sub-state of the current family, if the state has one.
    pub fn switch_state(&self) -> Option<StationState> {
        match self {
            Self::ReceiveOnly(_) => Some(Self::ReceiveOnly(RxPhase::Switch)),
            Self::Transmit(band, _) => Some(Self::Transmit(*band, TxPhase::Switch)),
            _ => None,
        }
    }

    /// Whether the state is a transient action sub-state.
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            Self::ReceiveOnly(RxPhase::Action(_)) | Self::Transmit(_, TxPhase::Action(_))
        )
    }

    pub fn is_cooling(&self) -> bool {
        matches!(self, Self::Transmit(_, TxPhase::Cooling))
    }

}

impl fmt::Display for StationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.primary(), self.secondary_name())
    }
}

fn rx_phase_name(phase: RxPhase) -> String {
    match phase {
        RxPhase::Receive => "RECEIVE".to_string(),
        RxPhase::Switch => "RX_SWITCH".to_string(),
        RxPhase::Shutdown => "RX_SHUTDOWN".to_string(),
        RxPhase::Action(action) => format!("RX_{}", action_name(None, action)),
    }
}

fn tx_phase_name(band: Band, phase: TxPhase) -> String {
    let prefix = band.prefix();
    match phase {
        TxPhase::Transmit => match band {
            Band::Vhf => "VHF_TRANSMIT".to_string(),
            Band::Uhf => "UHF_TRANSMIT".to_string(),
            Band::LBand => "L_TRANSMIT".to_string(),
        },
        TxPhase::Switch => format!("{prefix}_SWITCH"),
        TxPhase::Shutdown => format!("{prefix}_SHUTDOWN"),
        TxPhase::Cooling => format!("{prefix}_PA_COOL"),
        TxPhase::CooledDown => format!("{prefix}_PA_DOWN"),
        TxPhase::Action(action) => format!("{prefix}_{}", action_name(Some(band), action)),
    }
}

fn action_name(family: Option<Band>, action: Action) -> String {
    match action {
        Action::SwapOn => "RX_SWAP_ON".to_string(),
        Action::SwapOff => "RX_SWAP_OFF".to_string(),
        Action::KeyOn => "TRANS_ON".to_string(),
        Action::KeyOff => "TRANS_OFF".to_string(),
        // A band's own relay drops the band qualifier (V_LHCP vs V_UHF_LHCP).
        Action::Polarize(target, hand) if family == Some(target) => hand.suffix().to_string(),
        Action::Polarize(target, hand) => format!("{}_{}", target.name(), hand.suffix()),
    }
}

/// Read-only view of the station published to operator tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub primary: String,
    pub secondary: String,
    /// Names of the energized actuator lines, `None` if the bus could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actuators: Option<Vec<String>>,
    /// Milliseconds until the pending deferred transition fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_remaining_ms: Option<u64>,
    /// Milliseconds since the last transition began.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_state_ms: Option<u64>,
    pub transition_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_advisory: Option<String>,
}

impl StationSnapshot {
    /// Snapshot of a freshly started station, before the bus is read.
    pub fn initial() -> Self {
        Self {
            primary: PrimaryState::Init.name().to_string(),
            secondary: "NONE".to_string(),
            actuators: None,
            timer_remaining_ms: None,
            time_in_state_ms: None,
            transition_count: 0,
            last_advisory: None,
        }
    }

    /// One-line `PRIMARY:SECONDARY` form used in text replies.
    pub fn status_line(&self) -> String {
        format!("{}:{}", self.primary, self.secondary)
    }
}
