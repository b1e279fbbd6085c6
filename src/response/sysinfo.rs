// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `system.get_sysinfo` reply parsing.

use serde::Deserialize;

/// System information returned by `system.get_sysinfo`.
///
/// Only `relay_state` and `led_off` are required; the descriptive fields
/// vary between hardware and firmware versions.
///
/// # Examples
///
/// ```
/// use hs100::response::SysInfo;
///
/// let json = r#"{
///     "err_code": 0,
///     "alias": "Kettle",
///     "model": "HS110(EU)",
///     "feature": "TIM:ENE",
///     "relay_state": 1,
///     "led_off": 0
/// }"#;
/// let info: SysInfo = serde_json::from_str(json).unwrap();
/// assert!(info.relay_on());
/// assert!(info.led_on());
/// assert!(info.has_emeter());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SysInfo {
    /// 1 if the relay is on.
    pub relay_state: u8,
    /// 1 if the LED is switched off.
    pub led_off: u8,
    /// User-assigned name.
    #[serde(default)]
    pub alias: String,
    /// Model string, e.g. `HS100(EU)`.
    #[serde(default)]
    pub model: String,
    /// MAC address.
    #[serde(default)]
    pub mac: String,
    /// Device ID.
    #[serde(rename = "deviceId", default)]
    pub device_id: String,
    /// Hardware ID.
    #[serde(rename = "hwId", default)]
    pub hardware_id: String,
    /// Colon-separated feature flags, e.g. `TIM:ENE`.
    #[serde(default)]
    pub feature: String,
    /// Software version.
    #[serde(default)]
    pub sw_ver: String,
    /// Hardware version.
    #[serde(default)]
    pub hw_ver: String,
    /// Human-readable device type.
    #[serde(default)]
    pub dev_name: String,
    /// Wi-Fi signal strength in dBm.
    #[serde(default)]
    pub rssi: Option<i32>,
    /// Seconds since the relay was last switched on.
    #[serde(default)]
    pub on_time: Option<u64>,
    /// Whether a firmware update is running.
    #[serde(default)]
    pub updating: Option<u8>,
}

impl SysInfo {
    /// Returns whether the relay is on.
    #[must_use]
    pub fn relay_on(&self) -> bool {
        self.relay_state == 1
    }

    /// Returns whether the LED is on.
    #[must_use]
    pub fn led_on(&self) -> bool {
        self.led_off == 0
    }

    /// Returns whether the plug reports an energy meter.
    #[must_use]
    pub fn has_emeter(&self) -> bool {
        self.feature.split(':').any(|f| f == "ENE")
    }
}
