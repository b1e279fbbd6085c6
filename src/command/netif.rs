// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands of the `netif` group (Wi-Fi station settings).

use serde_json::{Value, json};

use crate::command::{Command, flag};

/// Key type the firmware expects for WPA2 networks.
const KEY_TYPE_WPA2: u8 = 3;

/// Commands of the `netif` group.
///
/// # Examples
///
/// ```
/// use hs100::command::{Command, NetifCommand};
///
/// let join = NetifCommand::SetStationInfo {
///     ssid: "home".to_string(),
///     password: "secret".to_string(),
/// };
/// assert_eq!(join.name(), "set_stainfo");
/// assert_eq!(join.data().unwrap()["key_type"], 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetifCommand {
    /// Scan for wireless networks, optionally forcing a fresh scan.
    GetScanInfo {
        /// Whether to refresh the scan results.
        refresh: bool,
    },
    /// Join a wireless network.
    SetStationInfo {
        /// Network name.
        ssid: String,
        /// Network password.
        password: String,
    },
}

impl Command for NetifCommand {
    fn group(&self) -> &'static str {
        "netif"
    }

    fn name(&self) -> &'static str {
        match self {
            Self::GetScanInfo { .. } => "get_scaninfo",
            Self::SetStationInfo { .. } => "set_stainfo",
        }
    }

    fn data(&self) -> Option<Value> {
        Some(match self {
            Self::GetScanInfo { refresh } => json!({ "refresh": flag(*refresh) }),
            Self::SetStationInfo { ssid, password } => json!({
                "ssid": ssid,
                "password": password,
                "key_type": KEY_TYPE_WPA2,
            }),
        })
    }
}
