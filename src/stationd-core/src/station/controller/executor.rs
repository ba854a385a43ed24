// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Hardware commit procedures.
//!
//! `TransitionExecutor::apply` performs the register writes for one
//! destination state and reports where the station comes to rest and
//! whether the deferred timer must be armed. Entry and action sub-states
//! collapse to the family's switch sub-state within the same call.

use std::error::Error as StdError;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::station::actuator::{
    self, Actuator, RECEIVE_ENTRY, RECEIVE_SHUTDOWN, SYSTEM_POWER, TRANSMIT_CHAIN,
};
use crate::station::state::{Action, Band, Polarization, RxPhase, StationState, TxPhase};
use crate::station::RegisterBus;
use crate::DynResult;

use super::timer::StationTiming;

/// Resting point reached by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub state: StationState,
    /// Arm the deferred timer for this long.
    pub arm: Option<Duration>,
}

impl Settled {
    fn rest(state: StationState) -> Self {
        Self { state, arm: None }
    }

    fn armed(state: StationState, duration: Duration) -> Self {
        Self {
            state,
            arm: Some(duration),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommitError {
    /// A register write failed part-way through the procedure.
    #[error("register bus: {0}")]
    Bus(Box<dyn StdError + Send + Sync>),
    /// No procedure exists for this destination.
    #[error("no commit procedure for {0}")]
    Unhandled(StationState),
}

impl From<Box<dyn StdError + Send + Sync>> for CommitError {
    fn from(value: Box<dyn StdError + Send + Sync>) -> Self {
        Self::Bus(value)
    }
}

/// Applies destination states to the register bus.
pub struct TransitionExecutor<'a> {
    bus: &'a mut dyn RegisterBus,
    timing: &'a StationTiming,
}

impl<'a> TransitionExecutor<'a> {
    pub fn new(bus: &'a mut dyn RegisterBus, timing: &'a StationTiming) -> Self {
        Self { bus, timing }
    }

    pub fn apply(&mut self, target: StationState) -> Result<Settled, CommitError> {
        match target {
            StationState::Init => {
                self.bus.reset_all()?;
                Ok(Settled::rest(StationState::Init))
            }
            StationState::SystemPowerOn => {
                self.bus.set_bits(SYSTEM_POWER)?;
                Ok(Settled::armed(
                    StationState::SystemPowerOn,
                    self.timing.power_on_timeout,
                ))
            }
            StationState::Standby => {
                self.enter_standby()?;
                Ok(Settled::rest(StationState::Standby))
            }
            StationState::ReceiveOnly(phase) => self.apply_receive(target, phase),
            StationState::Transmit(band, phase) => self.apply_transmit(target, band, phase),
        }
    }

    /// Drop every PA, PTT and key line.
    pub fn enter_standby(&mut self) -> DynResult<()> {
        self.bus.clear_bits(TRANSMIT_CHAIN)
    }

    /// Release the band's PA and key lines once the cooldown has elapsed.
    pub fn release_cooldown(&mut self, band: Band) -> DynResult<()> {
        let wiring = actuator::wiring(band);
        self.bus.clear_bit(wiring.pa)?;
        if let Some(key) = wiring.key {
            self.bus.clear_bit(key)?;
        }
        Ok(())
    }

    fn apply_receive(
        &mut self,
        target: StationState,
        phase: RxPhase,
    ) -> Result<Settled, CommitError> {
        let switch = StationState::ReceiveOnly(RxPhase::Switch);
        match phase {
            RxPhase::Receive => {
                self.bus.set_bits(RECEIVE_ENTRY)?;
                Ok(Settled::rest(switch))
            }
            RxPhase::Switch => Ok(Settled::rest(switch)),
            // No PA on the receive path, so no cooldown.
            RxPhase::Shutdown => {
                self.bus.clear_bits(RECEIVE_SHUTDOWN)?;
                self.enter_standby()?;
                Ok(Settled::rest(StationState::Standby))
            }
            RxPhase::Action(Action::SwapOn) => {
                self.bus.set_bit(Actuator::RxSwap)?;
                Ok(Settled::rest(switch))
            }
            RxPhase::Action(Action::SwapOff) => {
                self.bus.clear_bit(Actuator::RxSwap)?;
                Ok(Settled::rest(switch))
            }
            RxPhase::Action(Action::Polarize(band, hand)) => {
                let relay = polarization_relay(target, band)?;
                self.drive_relay(relay, hand)?;
                Ok(Settled::rest(switch))
            }
            RxPhase::Action(Action::KeyOn | Action::KeyOff) => {
                Err(CommitError::Unhandled(target))
            }
        }
    }

    fn apply_transmit(
        &mut self,
        target: StationState,
        band: Band,
        phase: TxPhase,
    ) -> Result<Settled, CommitError> {
        let wiring = actuator::wiring(band);
        let switch = StationState::Transmit(band, TxPhase::Switch);
        match phase {
            TxPhase::Transmit => {
                self.bus.set_bits(wiring.entry)?;
                Ok(Settled::rest(switch))
            }
            TxPhase::Switch => Ok(Settled::rest(switch)),
            TxPhase::Shutdown => {
                self.bus.clear_bits(wiring.shutdown)?;
                Ok(Settled::armed(
                    StationState::Transmit(band, TxPhase::Cooling),
                    self.timing.cooldown,
                ))
            }
            // Reached only through timer expiry.
            TxPhase::Cooling | TxPhase::CooledDown => Err(CommitError::Unhandled(target)),
            TxPhase::Action(action) => {
                match action {
                    Action::SwapOn => self.bus.set_bit(Actuator::RxSwap)?,
                    Action::SwapOff => self.bus.clear_bit(Actuator::RxSwap)?,
                    Action::KeyOn => self.bus.set_bit(wiring.ptt)?,
                    Action::KeyOff => self.bus.clear_bit(wiring.ptt)?,
                    Action::Polarize(relay_band, hand) => {
                        let relay = polarization_relay(target, relay_band)?;
                        if relay_band == band {
                            self.guarded_flip(wiring.ptt, relay, hand)?;
                        } else {
                            self.drive_relay(relay, hand)?;
                        }
                    }
                }
                Ok(Settled::rest(switch))
            }
        }
    }

    /// Flip the band's own relay with PTT held off around the switch.
    fn guarded_flip(
        &mut self,
        ptt: Actuator,
        relay: Actuator,
        hand: Polarization,
    ) -> DynResult<()> {
        let keyed = self.bus.read_bit(ptt)?;
        debug!("Polarization flip on {}, {} was {}", relay, ptt, keyed);
        self.bus.clear_bit(ptt)?;
        self.guard();
        self.drive_relay(relay, hand)?;
        self.guard();
        if keyed {
            self.bus.set_bit(ptt)
        } else {
            self.bus.clear_bit(ptt)
        }
    }

    fn drive_relay(&mut self, relay: Actuator, hand: Polarization) -> DynResult<()> {
        match hand {
            Polarization::Left => self.bus.set_bit(relay),
            Polarization::Right => self.bus.clear_bit(relay),
        }
    }

    fn guard(&self) {
        if !self.timing.guard_interval.is_zero() {
            thread::sleep(self.timing.guard_interval);
        }
    }
}

fn polarization_relay(target: StationState, band: Band) -> Result<Actuator, CommitError> {
    actuator::wiring(band)
        .polarization
        .ok_or(CommitError::Unhandled(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::controller::testing::{BusOp, RecordingBus};

    fn apply(bus: &mut RecordingBus, target: StationState) -> Result<Settled, CommitError> {
        let timing = StationTiming::default();
        TransitionExecutor::new(bus, &timing).apply(target)
    }

    #[test]
    fn test_system_power_on_arms_power_timeout() {
        let mut bus = RecordingBus::new();
        let settled = apply(&mut bus, StationState::SystemPowerOn).unwrap();
        assert_eq!(settled.state, StationState::SystemPowerOn);
        assert_eq!(settled.arm, Some(Duration::from_secs(60)));
        assert_eq!(bus.value(), SYSTEM_POWER);
    }

    #[test]
    fn test_transmit_entry_collapses_to_switch() {
        let mut bus = RecordingBus::new();
        let target = StationState::Transmit(Band::Uhf, TxPhase::Transmit);
        let settled = apply(&mut bus, target).unwrap();
        assert_eq!(
            settled,
            Settled::rest(StationState::Transmit(Band::Uhf, TxPhase::Switch))
        );
        assert_eq!(
            bus.value(),
            Actuator::VhfLna | Actuator::UhfPa | Actuator::UhfKey
        );
    }

    #[test]
    fn test_transmit_shutdown_starts_cooling() {
        let wiring = actuator::wiring(Band::Vhf);
        let mut bus =
            RecordingBus::with_value(wiring.entry | wiring.ptt | Actuator::VhfPolarization);
        let target = StationState::Transmit(Band::Vhf, TxPhase::Shutdown);
        let settled = apply(&mut bus, target).unwrap();
        assert_eq!(
            settled,
            Settled::armed(
                StationState::Transmit(Band::Vhf, TxPhase::Cooling),
                Duration::from_secs(120)
            )
        );
        assert!(!bus.is_set(Actuator::VhfPtt));
        assert!(!bus.is_set(Actuator::VhfPolarization));
        // PA and key stay up until the cooldown expires.
        assert!(bus.is_set(Actuator::VhfPa));
        assert!(bus.is_set(Actuator::VhfKey));
    }

    #[test]
    fn test_receive_shutdown_drops_to_standby() {
        let mut bus = RecordingBus::with_value(RECEIVE_ENTRY | Actuator::RxSwap);
        let settled = apply(&mut bus, StationState::ReceiveOnly(RxPhase::Shutdown)).unwrap();
        assert_eq!(settled, Settled::rest(StationState::Standby));
        assert!(bus.value().is_empty());
    }

    #[test]
    fn test_guarded_flip_order_with_ptt_set() {
        let mut bus = RecordingBus::with_value(Actuator::VhfPtt.mask());
        let target = StationState::Transmit(
            Band::Vhf,
            TxPhase::Action(Action::Polarize(Band::Vhf, Polarization::Left)),
        );
        apply(&mut bus, target).unwrap();
        assert_eq!(
            bus.ops(),
            vec![
                BusOp::Read,
                BusOp::Clear(Actuator::VhfPtt.mask()),
                BusOp::Set(Actuator::VhfPolarization.mask()),
                BusOp::Set(Actuator::VhfPtt.mask()),
            ]
        );
        assert!(bus.is_set(Actuator::VhfPtt));
        assert!(bus.is_set(Actuator::VhfPolarization));
    }

    #[test]
    fn test_guarded_flip_keeps_clear_ptt_clear() {
        let mut bus = RecordingBus::with_value(Actuator::UhfPolarization.mask());
        let target = StationState::Transmit(
            Band::Uhf,
            TxPhase::Action(Action::Polarize(Band::Uhf, Polarization::Right)),
        );
        apply(&mut bus, target).unwrap();
        assert!(!bus.is_set(Actuator::UhfPtt));
        assert!(!bus.is_set(Actuator::UhfPolarization));
    }

    #[test]
    fn test_cross_band_flip_is_single_write() {
        let mut bus = RecordingBus::with_value(Actuator::LBandPtt.mask());
        let target = StationState::Transmit(
            Band::LBand,
            TxPhase::Action(Action::Polarize(Band::Uhf, Polarization::Left)),
        );
        apply(&mut bus, target).unwrap();
        assert_eq!(bus.ops(), vec![BusOp::Set(Actuator::UhfPolarization.mask())]);
    }

    #[test]
    fn test_unhandled_destinations() {
        let mut bus = RecordingBus::new();
        for target in [
            StationState::Transmit(Band::Vhf, TxPhase::Cooling),
            StationState::Transmit(Band::Uhf, TxPhase::CooledDown),
            StationState::ReceiveOnly(RxPhase::Action(Action::KeyOn)),
            StationState::ReceiveOnly(RxPhase::Action(Action::Polarize(
                Band::LBand,
                Polarization::Left,
            ))),
        ] {
            assert!(matches!(
                apply(&mut bus, target),
                Err(CommitError::Unhandled(s)) if s == target
            ));
        }
        assert!(bus.ops().is_empty());
    }

    #[test]
    fn test_bus_fault_is_reported() {
        let mut bus = RecordingBus::new();
        bus.set_faulty(true);
        let err = apply(&mut bus, StationState::SystemPowerOn).unwrap_err();
        assert!(matches!(err, CommitError::Bus(_)));
        assert!(err.to_string().contains("simulated bus fault"));
    }

    #[test]
    fn test_release_cooldown() {
        let mut bus = RecordingBus::with_value(Actuator::LBandPa | Actuator::UhfLna);
        let timing = StationTiming::default();
        TransitionExecutor::new(&mut bus, &timing)
            .release_cooldown(Band::LBand)
            .unwrap();
        assert_eq!(bus.value(), Actuator::UhfLna.mask());
    }
}
