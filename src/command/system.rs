// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands of the `system` group.

use serde_json::{Value, json};

use crate::command::{Command, flag};

/// Commands of the `system` group.
///
/// # Examples
///
/// ```
/// use hs100::command::{Command, SystemCommand};
///
/// // The firmware inverts the LED flag: `off: 1` turns the LED off.
/// let led_on = SystemCommand::SetLedOff(false);
/// assert_eq!(led_on.name(), "set_led_off");
/// assert_eq!(led_on.data(), Some(serde_json::json!({"off": 0})));
///
/// let alias = SystemCommand::SetAlias("Kitchen".to_string());
/// assert_eq!(alias.data(), Some(serde_json::json!({"alias": "Kitchen"})));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SystemCommand {
    /// Query system information (relay state, LED, identity).
    GetSysInfo,
    /// Reboot after the given delay in seconds.
    Reboot {
        /// Delay in seconds.
        delay: u32,
    },
    /// Reset to factory settings after the given delay in seconds.
    Reset {
        /// Delay in seconds.
        delay: u32,
    },
    /// Switch the relay on (`true`) or off.
    SetRelayState(bool),
    /// Switch the LED off (`true`) or on.
    SetLedOff(bool),
    /// Set the device alias.
    SetAlias(String),
    /// Set the MAC address.
    SetMacAddress(String),
    /// Set the device ID.
    SetDeviceId(String),
    /// Set the hardware ID.
    SetHardwareId(String),
    /// Set the geographical location.
    SetLocation {
        /// Longitude in degrees.
        longitude: f64,
        /// Latitude in degrees.
        latitude: f64,
    },
    /// Check the U-Boot loader.
    TestCheckUboot,
    /// Query the device icon.
    GetIcon,
    /// Set the device icon.
    SetIcon {
        /// Icon data.
        icon: String,
        /// Icon hash.
        hash: String,
    },
    /// Enable or disable test mode.
    SetTestMode(bool),
    /// Start downloading firmware from a URL.
    DownloadFirmware(String),
    /// Query the firmware download state.
    GetDownloadState,
    /// Flash the downloaded firmware.
    FlashFirmware,
    /// Check for a new configuration.
    CheckNewConfig,
}

impl Command for SystemCommand {
    fn group(&self) -> &'static str {
        "system"
    }

    fn name(&self) -> &'static str {
        match self {
            Self::GetSysInfo => "get_sysinfo",
            Self::Reboot { .. } => "reboot",
            Self::Reset { .. } => "reset",
            Self::SetRelayState(_) => "set_relay_state",
            Self::SetLedOff(_) => "set_led_off",
            Self::SetAlias(_) => "set_dev_alias",
            Self::SetMacAddress(_) => "set_mac_addr",
            Self::SetDeviceId(_) => "set_device_id",
            Self::SetHardwareId(_) => "set_hw_id",
            Self::SetLocation { .. } => "set_dev_location",
            Self::TestCheckUboot => "test_check_uboot",
            Self::GetIcon => "get_dev_icon",
            Self::SetIcon { .. } => "set_dev_icon",
            Self::SetTestMode(_) => "set_test_mode",
            Self::DownloadFirmware(_) => "download_firmware",
            Self::GetDownloadState => "get_download_state",
            Self::FlashFirmware => "flash_firmware",
            Self::CheckNewConfig => "check_new_config",
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::GetSysInfo
            | Self::TestCheckUboot
            | Self::GetIcon
            | Self::GetDownloadState
            | Self::FlashFirmware
            | Self::CheckNewConfig => None,
            Self::Reboot { delay } | Self::Reset { delay } => Some(json!({ "delay": delay })),
            Self::SetRelayState(on) => Some(json!({ "state": flag(*on) })),
            Self::SetLedOff(off) => Some(json!({ "off": flag(*off) })),
            Self::SetAlias(alias) => Some(json!({ "alias": alias })),
            Self::SetMacAddress(mac) => Some(json!({ "mac": mac })),
            Self::SetDeviceId(id) => Some(json!({ "deviceId": id })),
            Self::SetHardwareId(id) => Some(json!({ "hwId": id })),
            Self::SetLocation {
                longitude,
                latitude,
            } => Some(json!({ "longitude": longitude, "latitude": latitude })),
            Self::SetIcon { icon, hash } => Some(json!({ "icon": icon, "hash": hash })),
            Self::SetTestMode(enable) => Some(json!({ "enable": flag(*enable) })),
            Self::DownloadFirmware(url) => Some(json!({ "url": url })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_state_payload() {
        assert_eq!(
            SystemCommand::SetRelayState(true).data(),
            Some(json!({"state": 1}))
        );
        assert_eq!(
            SystemCommand::SetRelayState(false).data(),
            Some(json!({"state": 0}))
        );
    }

    #[test]
    fn identity_payload_field_names() {
        assert_eq!(
            SystemCommand::SetDeviceId("ABC".into()).data(),
            Some(json!({"deviceId": "ABC"}))
        );
        assert_eq!(
            SystemCommand::SetHardwareId("DEF".into()).data(),
            Some(json!({"hwId": "DEF"}))
        );
        assert_eq!(SystemCommand::SetMacAddress(String::new()).name(), "set_mac_addr");
    }

    #[test]
    fn location_payload() {
        let cmd = SystemCommand::SetLocation {
            longitude: 19.04,
            latitude: 47.5,
        };
        assert_eq!(cmd.name(), "set_dev_location");
        assert_eq!(cmd.data(), Some(json!({"longitude": 19.04, "latitude": 47.5})));
    }

    #[test]
    fn reboot_and_reset_carry_delay() {
        assert_eq!(
            SystemCommand::Reboot { delay: 1 }.data(),
            Some(json!({"delay": 1}))
        );
        assert_eq!(SystemCommand::Reset { delay: 3 }.name(), "reset");
    }

    #[test]
    fn queries_have_no_data() {
        for cmd in [
            SystemCommand::GetSysInfo,
            SystemCommand::GetIcon,
            SystemCommand::GetDownloadState,
            SystemCommand::FlashFirmware,
        ] {
            assert_eq!(cmd.data(), None, "{}", cmd.name());
        }
    }
}
