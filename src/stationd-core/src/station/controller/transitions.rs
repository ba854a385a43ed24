// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Per-state transition tables.
//!
//! `propose` is pure: it looks at the authoritative state and one token and
//! says what the dispatcher should do. It never touches hardware.

use crate::station::state::{Action, Band, RxPhase, StationState, TxPhase};
use crate::station::token::Token;

/// Outcome of looking a token up in the transition tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proposal {
    /// Stage this state for commit.
    Transition(StationState),
    /// Token is not legal here.
    Invalid,
    /// A sub-state that never rests persisted; stage this correction instead.
    Recover(StationState),
    /// Transmit family is cooling; only advise the operator.
    CooldownWait,
}

/// Look up `token` in the table of `state`.
pub fn propose(state: StationState, token: Token) -> Proposal {
    // Kill short-circuits every table.
    if token == Token::Kill {
        return Proposal::Transition(StationState::Init);
    }

    match state {
        StationState::Init => match token {
            Token::PowerOn => Proposal::Transition(StationState::SystemPowerOn),
            _ => Proposal::Invalid,
        },
        StationState::SystemPowerOn => match token {
            Token::Operate => Proposal::Transition(StationState::Standby),
            _ => Proposal::Invalid,
        },
        StationState::Standby => standby_table(token),
        StationState::ReceiveOnly(phase) => receive_table(phase, token),
        StationState::Transmit(band, phase) => transmit_table(band, phase, token),
    }
}

fn standby_table(token: Token) -> Proposal {
    if token == Token::SelectRx {
        return Proposal::Transition(StationState::ReceiveOnly(RxPhase::Receive));
    }
    match token.selected_band() {
        Some(band) => Proposal::Transition(StationState::Transmit(band, TxPhase::Transmit)),
        None => Proposal::Invalid,
    }
}

fn receive_table(phase: RxPhase, token: Token) -> Proposal {
    match phase {
        RxPhase::Receive | RxPhase::Switch => match receive_next(token) {
            Some(next) => Proposal::Transition(StationState::ReceiveOnly(next)),
            None => Proposal::Invalid,
        },
        RxPhase::Action(_) => Proposal::Recover(StationState::ReceiveOnly(RxPhase::Switch)),
        // Shutdown only persists after a failed clear; commit it again.
        RxPhase::Shutdown => Proposal::Recover(StationState::ReceiveOnly(RxPhase::Shutdown)),
    }
}

fn receive_next(token: Token) -> Option<RxPhase> {
    match token {
        Token::RxSwapOn => Some(RxPhase::Action(Action::SwapOn)),
        Token::RxSwapOff => Some(RxPhase::Action(Action::SwapOff)),
        Token::Shutdown => Some(RxPhase::Shutdown),
        other => other
            .polarization()
            .map(|(band, hand)| RxPhase::Action(Action::Polarize(band, hand))),
    }
}

fn transmit_table(band: Band, phase: TxPhase, token: Token) -> Proposal {
    match phase {
        TxPhase::Transmit | TxPhase::Switch => match transmit_next(band, token) {
            Some(next) => Proposal::Transition(StationState::Transmit(band, next)),
            None => Proposal::Invalid,
        },
        TxPhase::Action(_) | TxPhase::CooledDown => {
            Proposal::Recover(StationState::Transmit(band, TxPhase::Switch))
        }
        // A persisting shutdown means the clear failed and no cooldown is armed.
        TxPhase::Shutdown => Proposal::Recover(StationState::Transmit(band, TxPhase::Shutdown)),
        TxPhase::Cooling => Proposal::CooldownWait,
    }
}

fn transmit_next(band: Band, token: Token) -> Option<TxPhase> {
    match token {
        Token::RxSwapOn => return Some(TxPhase::Action(Action::SwapOn)),
        Token::RxSwapOff => return Some(TxPhase::Action(Action::SwapOff)),
        Token::Shutdown => return Some(TxPhase::Shutdown),
        _ => {}
    }
    // Either relay may be flipped from any transmit family.
    if let Some((target, hand)) = token.polarization() {
        return Some(TxPhase::Action(Action::Polarize(target, hand)));
    }
    // Keying only for the family's own band.
    match token.keying() {
        Some((keyed, true)) if keyed == band => Some(TxPhase::Action(Action::KeyOn)),
        Some((keyed, false)) if keyed == band => Some(TxPhase::Action(Action::KeyOff)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::state::Polarization;

    const BANDS: [Band; 3] = [Band::Vhf, Band::Uhf, Band::LBand];

    fn valid_tokens(state: StationState) -> Vec<Token> {
        Token::ALL
            .into_iter()
            .filter(|t| !matches!(propose(state, *t), Proposal::Invalid))
            .collect()
    }

    #[test]
    fn test_init_accepts_only_power_on_and_kill() {
        assert_eq!(
            valid_tokens(StationState::Init),
            vec![Token::PowerOn, Token::Kill]
        );
        assert_eq!(
            propose(StationState::Init, Token::SelectRx),
            Proposal::Invalid
        );
        assert_eq!(
            propose(StationState::Init, Token::Unknown),
            Proposal::Invalid
        );
    }

    #[test]
    fn test_system_power_on_accepts_only_operate() {
        assert_eq!(
            valid_tokens(StationState::SystemPowerOn),
            vec![Token::Operate, Token::Kill]
        );
        assert_eq!(
            propose(StationState::SystemPowerOn, Token::Operate),
            Proposal::Transition(StationState::Standby)
        );
    }

    #[test]
    fn test_standby_selects_exactly_one_path() {
        assert_eq!(
            propose(StationState::Standby, Token::SelectRx),
            Proposal::Transition(StationState::ReceiveOnly(RxPhase::Receive))
        );
        assert_eq!(
            propose(StationState::Standby, Token::SelectVhfTx),
            Proposal::Transition(StationState::Transmit(Band::Vhf, TxPhase::Transmit))
        );
        assert_eq!(
            propose(StationState::Standby, Token::SelectLBandTx),
            Proposal::Transition(StationState::Transmit(Band::LBand, TxPhase::Transmit))
        );
        assert_eq!(
            propose(StationState::Standby, Token::VhfTxOn),
            Proposal::Invalid
        );
        assert_eq!(valid_tokens(StationState::Standby).len(), 5);
    }

    #[test]
    fn test_kill_from_every_state() {
        let mut states = vec![
            StationState::Init,
            StationState::SystemPowerOn,
            StationState::Standby,
            StationState::ReceiveOnly(RxPhase::Switch),
            StationState::ReceiveOnly(RxPhase::Shutdown),
            StationState::ReceiveOnly(RxPhase::Action(Action::SwapOn)),
        ];
        for band in BANDS {
            for phase in [
                TxPhase::Transmit,
                TxPhase::Switch,
                TxPhase::Shutdown,
                TxPhase::Cooling,
                TxPhase::CooledDown,
                TxPhase::Action(Action::KeyOn),
            ] {
                states.push(StationState::Transmit(band, phase));
            }
        }
        for state in states {
            assert_eq!(
                propose(state, Token::Kill),
                Proposal::Transition(StationState::Init),
                "kill from {state}"
            );
        }
    }

    #[test]
    fn test_receive_family_table() {
        let switch = StationState::ReceiveOnly(RxPhase::Switch);
        assert_eq!(
            propose(switch, Token::UhfLeft),
            Proposal::Transition(StationState::ReceiveOnly(RxPhase::Action(
                Action::Polarize(Band::Uhf, Polarization::Left)
            )))
        );
        assert_eq!(
            propose(switch, Token::Shutdown),
            Proposal::Transition(StationState::ReceiveOnly(RxPhase::Shutdown))
        );
        assert_eq!(propose(switch, Token::VhfTxOn), Proposal::Invalid);
        assert_eq!(propose(switch, Token::SelectRx), Proposal::Invalid);
    }

    #[test]
    fn test_persisting_shutdown_is_committed_again() {
        let rx_shutdown = StationState::ReceiveOnly(RxPhase::Shutdown);
        for token in [Token::RxSwapOn, Token::SelectVhfTx, Token::Shutdown] {
            assert_eq!(propose(rx_shutdown, token), Proposal::Recover(rx_shutdown));
        }
        for band in BANDS {
            let shutdown = StationState::Transmit(band, TxPhase::Shutdown);
            assert_eq!(propose(shutdown, Token::Shutdown), Proposal::Recover(shutdown));
            assert_eq!(
                propose(StationState::Transmit(band, TxPhase::Cooling), Token::Shutdown),
                Proposal::CooldownWait
            );
        }
    }

    #[test]
    fn test_switch_sub_states_reject_foreign_tokens() {
        let always_invalid = [
            Token::PowerOn,
            Token::Operate,
            Token::SelectRx,
            Token::SelectVhfTx,
            Token::SelectUhfTx,
            Token::SelectLBandTx,
            Token::Unknown,
        ];
        let rx_switch = StationState::ReceiveOnly(RxPhase::Switch);
        for token in Token::ALL {
            let proposal = propose(rx_switch, token);
            let rejected = always_invalid.contains(&token) || token.is_query();
            if rejected || token.keying().is_some() {
                assert_eq!(proposal, Proposal::Invalid, "{token} in {rx_switch}");
            } else {
                assert!(matches!(proposal, Proposal::Transition(_)), "{token} in {rx_switch}");
            }
        }

        for band in BANDS {
            let switch = StationState::Transmit(band, TxPhase::Switch);
            for token in Token::ALL {
                let foreign_key = matches!(token.keying(), Some((keyed, _)) if keyed != band);
                let proposal = propose(switch, token);
                if always_invalid.contains(&token) || token.is_query() || foreign_key {
                    assert_eq!(proposal, Proposal::Invalid, "{token} in {switch}");
                } else {
                    assert!(matches!(proposal, Proposal::Transition(_)), "{token} in {switch}");
                }
            }
        }
    }

    #[test]
    fn test_keying_is_band_specific() {
        for band in BANDS {
            let switch = StationState::Transmit(band, TxPhase::Switch);
            for token in [
                Token::VhfTxOn,
                Token::UhfTxOn,
                Token::LBandTxOn,
                Token::VhfTxOff,
                Token::UhfTxOff,
                Token::LBandTxOff,
            ] {
                let (keyed, on) = token.keying().unwrap();
                let expected = if keyed == band {
                    let action = if on { Action::KeyOn } else { Action::KeyOff };
                    Proposal::Transition(StationState::Transmit(band, TxPhase::Action(action)))
                } else {
                    Proposal::Invalid
                };
                assert_eq!(propose(switch, token), expected, "{token} in {switch}");
            }
        }
    }

    #[test]
    fn test_cross_band_polarization_in_transmit_families() {
        let lband = StationState::Transmit(Band::LBand, TxPhase::Transmit);
        assert_eq!(
            propose(lband, Token::VhfRight),
            Proposal::Transition(StationState::Transmit(
                Band::LBand,
                TxPhase::Action(Action::Polarize(Band::Vhf, Polarization::Right))
            ))
        );
        let uhf = StationState::Transmit(Band::Uhf, TxPhase::Switch);
        assert_eq!(
            propose(uhf, Token::VhfLeft),
            Proposal::Transition(StationState::Transmit(
                Band::Uhf,
                TxPhase::Action(Action::Polarize(Band::Vhf, Polarization::Left))
            ))
        );
    }

    #[test]
    fn test_swap_relay_branches_are_exclusive() {
        for band in BANDS {
            let switch = StationState::Transmit(band, TxPhase::Switch);
            assert_eq!(
                propose(switch, Token::RxSwapOn),
                Proposal::Transition(StationState::Transmit(band, TxPhase::Action(Action::SwapOn)))
            );
            assert_eq!(
                propose(switch, Token::RxSwapOff),
                Proposal::Transition(StationState::Transmit(band, TxPhase::Action(Action::SwapOff)))
            );
        }
    }

    #[test]
    fn test_action_sub_state_triggers_recovery() {
        let pending = StationState::Transmit(
            Band::Vhf,
            TxPhase::Action(Action::Polarize(Band::Vhf, Polarization::Left)),
        );
        assert_eq!(
            propose(pending, Token::VhfLeft),
            Proposal::Recover(StationState::Transmit(Band::Vhf, TxPhase::Switch))
        );
        assert_eq!(
            propose(StationState::ReceiveOnly(RxPhase::Action(Action::SwapOff)), Token::Unknown),
            Proposal::Recover(StationState::ReceiveOnly(RxPhase::Switch))
        );
        assert_eq!(
            propose(StationState::Transmit(Band::Uhf, TxPhase::CooledDown), Token::UhfTxOn),
            Proposal::Recover(StationState::Transmit(Band::Uhf, TxPhase::Switch))
        );
    }

    #[test]
    fn test_cooling_only_advises() {
        for band in BANDS {
            let state = StationState::Transmit(band, TxPhase::Cooling);
            for token in Token::ALL.into_iter().filter(|t| *t != Token::Kill) {
                assert_eq!(propose(state, token), Proposal::CooldownWait);
            }
        }
    }
}
