// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Supported plug models.
//!
//! The HS100 and HS110 speak the same protocol; the HS110 adds an energy
//! meter (`emeter` command group).

use std::fmt;
use std::str::FromStr;

use crate::response::SysInfo;

/// A supported plug model.
///
/// # Examples
///
/// ```
/// use hs100::DeviceModel;
///
/// let model: DeviceModel = "HS110".parse().unwrap();
/// assert!(model.supports_emeter());
/// assert!(!DeviceModel::Hs100.supports_emeter());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceModel {
    /// Plain smart plug.
    #[default]
    Hs100,
    /// Smart plug with energy meter.
    Hs110,
}

impl DeviceModel {
    /// Returns whether the model answers `emeter` commands.
    #[must_use]
    pub const fn supports_emeter(self) -> bool {
        matches!(self, Self::Hs110)
    }

    /// Returns the model name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hs100 => "HS100",
            Self::Hs110 => "HS110",
        }
    }

    /// Determines the model from the feature flags of a system info reply.
    #[must_use]
    pub fn from_sysinfo(info: &SysInfo) -> Self {
        if info.has_emeter() {
            Self::Hs110
        } else {
            Self::Hs100
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS100" => Ok(Self::Hs100),
            "HS110" => Ok(Self::Hs110),
            _ => Err(format!("unknown device model: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("hs100".parse::<DeviceModel>().unwrap(), DeviceModel::Hs100);
        assert_eq!("Hs110".parse::<DeviceModel>().unwrap(), DeviceModel::Hs110);
        assert!("hs200".parse::<DeviceModel>().is_err());
    }

    #[test]
    fn from_sysinfo_features() {
        let metered: SysInfo =
            serde_json::from_str(r#"{"relay_state": 0, "led_off": 0, "feature": "TIM:ENE"}"#)
                .unwrap();
        let plain: SysInfo =
            serde_json::from_str(r#"{"relay_state": 0, "led_off": 0, "feature": "TIM"}"#).unwrap();
        assert_eq!(DeviceModel::from_sysinfo(&metered), DeviceModel::Hs110);
        assert_eq!(DeviceModel::from_sysinfo(&plain), DeviceModel::Hs100);
    }

    #[test]
    fn display() {
        assert_eq!(DeviceModel::Hs110.to_string(), "HS110");
    }
}
