// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands of the `time` group.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde_json::{Value, json};

use crate::command::Command;

/// Commands of the `time` group.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hs100::command::{Command, TimeCommand};
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 31)
///     .unwrap()
///     .and_hms_opt(2, 30, 0)
///     .unwrap();
/// let cmd = TimeCommand::SetTimezone { index: 39, at };
/// let data = cmd.data().unwrap();
/// assert_eq!(data["mday"], 31);
/// assert_eq!(data["index"], 39);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeCommand {
    /// Query the device clock.
    GetTime,
    /// Query the device time zone.
    GetTimezone,
    /// Set the time zone and the local time.
    SetTimezone {
        /// Firmware time zone index.
        index: u16,
        /// The local time to set.
        at: NaiveDateTime,
    },
}

impl Command for TimeCommand {
    fn group(&self) -> &'static str {
        "time"
    }

    fn name(&self) -> &'static str {
        match self {
            Self::GetTime => "get_time",
            Self::GetTimezone => "get_timezone",
            Self::SetTimezone { .. } => "set_timezone",
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::GetTime | Self::GetTimezone => None,
            Self::SetTimezone { index, at } => Some(json!({
                "year": at.year(),
                "month": at.month(),
                "mday": at.day(),
                "hour": at.hour(),
                "min": at.minute(),
                "sec": at.second(),
                "index": index,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn set_timezone_payload() {
        let at = NaiveDate::from_ymd_opt(2017, 1, 5)
            .unwrap()
            .and_hms_opt(18, 7, 9)
            .unwrap();
        let cmd = TimeCommand::SetTimezone { index: 24, at };
        assert_eq!(
            cmd.data(),
            Some(json!({
                "year": 2017, "month": 1, "mday": 5,
                "hour": 18, "min": 7, "sec": 9,
                "index": 24
            }))
        );
    }

    #[test]
    fn queries_have_no_data() {
        assert_eq!(TimeCommand::GetTime.data(), None);
        assert_eq!(TimeCommand::GetTimezone.name(), "get_timezone");
    }
}
