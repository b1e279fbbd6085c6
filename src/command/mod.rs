// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HS100/HS110 command catalogue.
//!
//! Every device operation is a fixed `(group, command, data)` triple. The
//! enums in this module name those triples and produce the exact data
//! payloads the plug firmware expects.
//!
//! # Available Commands
//!
//! | Command Type | Group | Purpose |
//! |-------------|-------|---------|
//! | [`SystemCommand`] | `system` | Relay, LED, identity, firmware |
//! | [`NetifCommand`] | `netif` | Wi-Fi scan and join |
//! | [`CloudCommand`] | `cnCloud` | Cloud server binding |
//! | [`TimeCommand`] | `time` | Clock and time zone |
//! | [`ScheduleCommand`] | `schedule` | Weekly on/off rules |
//! | [`CountdownCommand`] | `count_down` | Delayed actions |
//! | [`AntiTheftCommand`] | `anti_theft` | Random on/off away mode |
//! | [`EmeterCommand`] | `emeter` | Energy meter (HS110 only) |
//!
//! # Examples
//!
//! ```
//! use hs100::command::{Command, SystemCommand};
//!
//! let cmd = SystemCommand::SetRelayState(true);
//! assert_eq!(cmd.group(), "system");
//! assert_eq!(cmd.name(), "set_relay_state");
//! assert_eq!(
//!     cmd.envelope().to_string(),
//!     r#"{"system":{"set_relay_state":{"state":1}}}"#
//! );
//! ```

mod cloud;
mod emeter;
mod netif;
mod rules;
mod system;
mod time;

pub use cloud::CloudCommand;
pub use emeter::EmeterCommand;
pub use netif::NetifCommand;
pub use rules::{
    AntiTheftCommand, AntiTheftRule, CountdownCommand, CountdownRule, RuleAction, ScheduleCommand,
    ScheduleRule, TimeOption, Weekdays,
};
pub use system::SystemCommand;
pub use time::TimeCommand;

use serde_json::Value;

use crate::protocol::envelope;

/// A command that can be sent to a plug.
pub trait Command {
    /// Returns the group the command belongs to, e.g. `"system"`.
    fn group(&self) -> &'static str;

    /// Returns the command name within its group, e.g. `"set_relay_state"`.
    fn name(&self) -> &'static str;

    /// Returns the command data, or `None` for commands without parameters.
    fn data(&self) -> Option<Value>;

    /// Returns the full request envelope.
    ///
    /// The reply to this envelope carries the command's result under
    /// `reply[group][name]`.
    fn envelope(&self) -> Value {
        envelope(self.group(), self.name(), self.data())
    }
}

/// Converts a flag to the 0/1 integers the firmware uses.
pub(crate) fn flag(value: bool) -> u8 {
    u8::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_nests_group_and_name() {
        let cmd = SystemCommand::SetLedOff(true);
        let env = cmd.envelope();
        assert_eq!(env["system"]["set_led_off"]["off"], 1);
    }

    #[test]
    fn envelope_without_data_is_null() {
        let env = SystemCommand::GetSysInfo.envelope();
        assert_eq!(env.to_string(), r#"{"system":{"get_sysinfo":null}}"#);
    }

    #[test]
    fn flag_values() {
        assert_eq!(flag(true), 1);
        assert_eq!(flag(false), 0);
    }
}
