// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use tokio::sync::oneshot;

use crate::{StationResult, StationSnapshot, Token};

/// Request sent to the station task.
#[derive(Debug)]
pub struct StationRequest {
    pub token: Token,
    pub respond_to: oneshot::Sender<StationResult<StationSnapshot>>,
}
