// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot switching actions offered on the command line.

use std::fmt;
use std::str::FromStr;

use crate::device::Device;
use crate::error::Error;
use crate::protocol::Protocol;
use crate::response::Payload;

/// A relay or LED switching action.
///
/// # Examples
///
/// ```
/// use hs100::SwitchAction;
///
/// let action: SwitchAction = "ledoff".parse().unwrap();
/// assert_eq!(action, SwitchAction::LedOff);
/// assert_eq!(action.as_str(), "ledoff");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchAction {
    /// Switch the relay on.
    RelayOn,
    /// Switch the relay off.
    RelayOff,
    /// Switch the LED on.
    LedOn,
    /// Switch the LED off.
    LedOff,
}

impl SwitchAction {
    /// All actions.
    pub const ALL: [Self; 4] = [Self::RelayOn, Self::RelayOff, Self::LedOn, Self::LedOff];

    /// Returns the command-line name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RelayOn => "on",
            Self::RelayOff => "off",
            Self::LedOn => "ledon",
            Self::LedOff => "ledoff",
        }
    }

    /// Returns a short description of the action.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::RelayOn => "turn the device's relay on",
            Self::RelayOff => "turn the device's relay off",
            Self::LedOn => "turn the device's LED on",
            Self::LedOff => "turn the device's LED off",
        }
    }

    /// Performs the action on a device.
    ///
    /// # Errors
    ///
    /// Returns error if the device call fails.
    pub async fn apply<P: Protocol>(self, device: &Device<P>) -> Result<Payload, Error> {
        match self {
            Self::RelayOn => device.relay_on().await,
            Self::RelayOff => device.relay_off().await,
            Self::LedOn => device.led_on().await,
            Self::LedOff => device.led_off().await,
        }
    }
}

impl fmt::Display for SwitchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}
