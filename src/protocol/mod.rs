// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol for HS100/HS110 smart plugs.
//!
//! The plug listens on TCP port 9999. Each request is a JSON *envelope*
//! (`{group: {command: data}}`) obfuscated with the [`cipher`] and sent over
//! a fresh connection; the reply comes back on the same connection with the
//! same nesting.
//!
//! # Transports
//!
//! - [`TcpClient`]: one connection per call, as the plug expects
//!
//! Anything implementing [`Protocol`] can stand in for the plug, which is how
//! the daemon is exercised without hardware.

pub mod cipher;
mod tcp;

pub use tcp::{TcpClient, TcpConfig};

use serde_json::{Map, Value, json};

use crate::error::Error;

/// Builds a `{group: {command: data}}` envelope.
///
/// A command without data is sent with a JSON `null` value.
///
/// # Examples
///
/// ```
/// use hs100::protocol::envelope;
///
/// let env = envelope("system", "set_relay_state", Some(serde_json::json!({"state": 1})));
/// assert_eq!(env.to_string(), r#"{"system":{"set_relay_state":{"state":1}}}"#);
///
/// let query = envelope("system", "get_sysinfo", None);
/// assert_eq!(query.to_string(), r#"{"system":{"get_sysinfo":null}}"#);
/// ```
#[must_use]
pub fn envelope(group: &str, command: &str, data: Option<Value>) -> Value {
    let mut commands = Map::new();
    commands.insert(command.to_string(), data.unwrap_or(Value::Null));
    json!({ group: commands })
}

/// Trait for anything that can carry one request/reply exchange with a plug.
#[allow(async_fn_in_trait)]
pub trait Protocol {
    /// Sends an envelope and returns the decoded reply envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the exchange fails and
    /// [`Error::Protocol`] if the reply is not valid JSON.
    async fn call(&self, envelope: &Value) -> Result<Value, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_data() {
        let env = envelope("netif", "get_scaninfo", Some(json!({"refresh": 1})));
        assert_eq!(env["netif"]["get_scaninfo"]["refresh"], 1);
    }

    #[test]
    fn envelope_without_data_is_null() {
        let env = envelope("cnCloud", "unbind", None);
        assert!(env["cnCloud"]["unbind"].is_null());
        assert_eq!(env.as_object().map(Map::len), Some(1));
    }
}
