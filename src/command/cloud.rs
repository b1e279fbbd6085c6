// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands of the `cnCloud` group.

use serde_json::{Value, json};

use crate::command::Command;

/// Commands of the `cnCloud` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudCommand {
    /// Query cloud settings and connection status.
    GetInfo,
    /// Query the firmware list offered by the cloud server.
    GetFirmwareList,
    /// Set the cloud server URL.
    SetServerUrl(String),
    /// Bind the plug to a cloud account.
    Bind {
        /// Account user name.
        username: String,
        /// Account password.
        password: String,
    },
    /// Unbind the plug from its cloud account.
    Unbind,
}

impl Command for CloudCommand {
    fn group(&self) -> &'static str {
        "cnCloud"
    }

    fn name(&self) -> &'static str {
        match self {
            Self::GetInfo => "get_info",
            Self::GetFirmwareList => "get_intl_firmware_list",
            Self::SetServerUrl(_) => "set_server_url",
            Self::Bind { .. } => "bind",
            Self::Unbind => "unbind",
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::GetInfo | Self::GetFirmwareList | Self::Unbind => None,
            Self::SetServerUrl(server) => Some(json!({ "server": server })),
            Self::Bind { username, password } => {
                Some(json!({ "username": username, "password": password }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_payload() {
        let cmd = CloudCommand::Bind {
            username: "me@example.com".into(),
            password: "pw".into(),
        };
        assert_eq!(
            cmd.envelope(),
            json!({"cnCloud": {"bind": {"username": "me@example.com", "password": "pw"}}})
        );
    }

    #[test]
    fn server_url_payload() {
        let cmd = CloudCommand::SetServerUrl("devs.example.com".into());
        assert_eq!(cmd.data(), Some(json!({"server": "devs.example.com"})));
    }

    #[test]
    fn unbind_has_no_data() {
        assert_eq!(CloudCommand::Unbind.data(), None);
        assert_eq!(CloudCommand::GetFirmwareList.name(), "get_intl_firmware_list");
    }
}
