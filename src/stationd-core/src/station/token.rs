// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Command tokens accepted by the station and their wire names.

use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use super::state::{Band, Polarization};

/// External command. `Unknown` is the sentinel for anything that does not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    PowerOn,
    Operate,
    SelectRx,
    SelectVhfTx,
    SelectUhfTx,
    SelectLBandTx,

    RxSwapOn,
    RxSwapOff,

    VhfLeft,
    VhfRight,
    VhfTxOn,
    VhfTxOff,

    UhfLeft,
    UhfRight,
    UhfTxOn,
    UhfTxOff,

    LBandTxOn,
    LBandTxOff,

    Shutdown,
    Kill,

    Status,
    GetTemp,
    VhfPower,
    UhfPower,
    LBandPower,

    Unknown,
}

impl Token {
    /// Every decodable token, in wire order.
    pub const ALL: [Token; 25] = [
        Token::PowerOn,
        Token::Operate,
        Token::SelectRx,
        Token::SelectVhfTx,
        Token::SelectUhfTx,
        Token::SelectLBandTx,
        Token::RxSwapOn,
        Token::RxSwapOff,
        Token::VhfLeft,
        Token::VhfRight,
        Token::VhfTxOn,
        Token::VhfTxOff,
        Token::UhfLeft,
        Token::UhfRight,
        Token::UhfTxOn,
        Token::UhfTxOff,
        Token::LBandTxOn,
        Token::LBandTxOff,
        Token::Shutdown,
        Token::Kill,
        Token::Status,
        Token::GetTemp,
        Token::VhfPower,
        Token::UhfPower,
        Token::LBandPower,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::PowerOn => "PWR_ON",
            Self::Operate => "OPERATE",
            Self::SelectRx => "RX",
            Self::SelectVhfTx => "V_TX",
            Self::SelectUhfTx => "U_TX",
            Self::SelectLBandTx => "L_TX",
            Self::RxSwapOn => "RX_SWAP_ON",
            Self::RxSwapOff => "RX_SWAP_OFF",
            Self::VhfLeft => "V_LEFT",
            Self::VhfRight => "V_RIGHT",
            Self::VhfTxOn => "V_TX_ON",
            Self::VhfTxOff => "V_TX_OFF",
            Self::UhfLeft => "U_LEFT",
            Self::UhfRight => "U_RIGHT",
            Self::UhfTxOn => "U_TX_ON",
            Self::UhfTxOff => "U_TX_OFF",
            Self::LBandTxOn => "L_TX_ON",
            Self::LBandTxOff => "L_TX_OFF",
            Self::Shutdown => "SHUTDOWN",
            Self::Kill => "KILL",
            Self::Status => "STATUS",
            Self::GetTemp => "GETTEMP",
            Self::VhfPower => "V_POWER",
            Self::UhfPower => "U_POWER",
            Self::LBandPower => "L_POWER",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Decode a token name. Never fails: unrecognized input yields `Token::Unknown`.
    pub fn decode(name: &str) -> Token {
        let name = name.trim();
        let token = Self::ALL
            .into_iter()
            .find(|t| t.wire_name().eq_ignore_ascii_case(name))
            .unwrap_or(Token::Unknown);
        debug!("Token entered: {} ({})", name, token);
        token
    }

    /// Band selected by a transmit-path selection token.
    pub fn selected_band(self) -> Option<Band> {
        match self {
            Self::SelectVhfTx => Some(Band::Vhf),
            Self::SelectUhfTx => Some(Band::Uhf),
            Self::SelectLBandTx => Some(Band::LBand),
            _ => None,
        }
    }

    /// Polarization relay request carried by the token.
    pub fn polarization(self) -> Option<(Band, Polarization)> {
        match self {
            Self::VhfLeft => Some((Band::Vhf, Polarization::Left)),
            Self::VhfRight => Some((Band::Vhf, Polarization::Right)),
            Self::UhfLeft => Some((Band::Uhf, Polarization::Left)),
            Self::UhfRight => Some((Band::Uhf, Polarization::Right)),
            _ => None,
        }
    }

    /// Keying request carried by the token: band and requested PTT level.
    pub fn keying(self) -> Option<(Band, bool)> {
        match self {
            Self::VhfTxOn => Some((Band::Vhf, true)),
            Self::VhfTxOff => Some((Band::Vhf, false)),
            Self::UhfTxOn => Some((Band::Uhf, true)),
            Self::UhfTxOff => Some((Band::Uhf, false)),
            Self::LBandTxOn => Some((Band::LBand, true)),
            Self::LBandTxOff => Some((Band::LBand, false)),
            _ => None,
        }
    }

    /// Status and telemetry queries never reach the transition tables.
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Self::Status | Self::GetTemp | Self::VhfPower | Self::UhfPower | Self::LBandPower
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}
