// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Energy meter commands.
//!
//! Only the metered HS110 answers these; an HS100 rejects the whole group.

use serde_json::{Value, json};

use crate::command::Command;

/// Commands of the `emeter` group.
///
/// # Examples
///
/// ```
/// use hs100::command::{Command, EmeterCommand};
///
/// let cmd = EmeterCommand::GetDailyStats { year: 2024, month: 2 };
/// assert_eq!(cmd.name(), "get_daystat");
/// assert_eq!(cmd.data(), Some(serde_json::json!({"month": 2, "year": 2024})));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmeterCommand {
    /// Query realtime voltage, current and power.
    GetRealtime,
    /// Query the voltage and current gain.
    GetGain,
    /// Set the voltage and current gain.
    SetGain {
        /// Voltage gain.
        vgain: u32,
        /// Current gain.
        igain: u32,
    },
    /// Start calibrating against known targets.
    StartCalibration {
        /// Target voltage.
        vtarget: u32,
        /// Target current.
        itarget: u32,
    },
    /// Query per-day statistics of a month.
    GetDailyStats {
        /// Year.
        year: i32,
        /// Month (1-12).
        month: u32,
    },
    /// Query per-month statistics of a year.
    GetMonthlyStats {
        /// Year.
        year: i32,
    },
    /// Erase all statistics.
    EraseStats,
}

impl Command for EmeterCommand {
    fn group(&self) -> &'static str {
        "emeter"
    }

    fn name(&self) -> &'static str {
        match self {
            Self::GetRealtime => "get_realtime",
            Self::GetGain => "get_vgain_igain",
            Self::SetGain { .. } => "set_vgain_igain",
            Self::StartCalibration { .. } => "start_calibration",
            Self::GetDailyStats { .. } => "get_daystat",
            Self::GetMonthlyStats { .. } => "get_monthstat",
            Self::EraseStats => "erase_emeter_stat",
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::GetRealtime | Self::GetGain | Self::EraseStats => None,
            Self::SetGain { vgain, igain } => Some(json!({ "vgain": vgain, "igain": igain })),
            Self::StartCalibration { vtarget, itarget } => {
                Some(json!({ "vtarget": vtarget, "itarget": itarget }))
            }
            Self::GetDailyStats { year, month } => Some(json!({ "month": month, "year": year })),
            Self::GetMonthlyStats { year } => Some(json!({ "year": year })),
        }
    }
}
