// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reply envelope validation and typed replies.
//!
//! Every reply mirrors the request nesting: `reply[group][command]` is an
//! object that always contains an integer `err_code`. Zero means success
//! and the rest of the object is the command's result.

mod energy;
mod sysinfo;

pub use energy::EnergyReading;
pub use sysinfo::SysInfo;

use serde_json::{Map, Value};

use crate::error::{DeviceError, Error, ProtocolError};

/// The result object of a successful command, `err_code` included.
pub type Payload = Map<String, Value>;

/// Message used when the plug reports an error without `err_msg`.
const UNKNOWN_ERROR: &str = "unknown error";

/// Extracts and validates the result of `group`/`command` from a reply.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the reply does not contain the nesting or
/// the `err_code`, and [`Error::Device`] if `err_code` is non-zero.
///
/// # Examples
///
/// ```
/// use hs100::response::extract_payload;
/// use serde_json::json;
///
/// let reply = json!({"system": {"set_relay_state": {"err_code": 0}}});
/// let payload = extract_payload(&reply, "system", "set_relay_state").unwrap();
/// assert_eq!(payload["err_code"], 0);
///
/// let failed = json!({"system": {"set_relay_state": {"err_code": -3, "err_msg": "bad"}}});
/// assert!(extract_payload(&failed, "system", "set_relay_state").is_err());
/// ```
pub fn extract_payload(reply: &Value, group: &str, command: &str) -> Result<Payload, Error> {
    let result = reply
        .get(group)
        .ok_or_else(|| ProtocolError::MissingField(group.to_string()))?
        .get(command)
        .ok_or_else(|| ProtocolError::MissingField(format!("{group}.{command}")))?
        .as_object()
        .ok_or_else(|| {
            ProtocolError::UnexpectedFormat(format!("{group}.{command} is not an object"))
        })?;

    let code = result
        .get("err_code")
        .ok_or_else(|| ProtocolError::MissingField("err_code".to_string()))?
        .as_i64()
        .ok_or_else(|| ProtocolError::UnexpectedFormat("err_code is not an integer".to_string()))?;

    if code != 0 {
        let message = result
            .get("err_msg")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR)
            .to_string();
        return Err(DeviceError { code, message }.into());
    }

    Ok(result.clone())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_returns_payload_unmodified() {
        let reply = json!({"system": {"get_sysinfo": {
            "err_code": 0, "relay_state": 1, "alias": "Plug"
        }}});
        let payload = extract_payload(&reply, "system", "get_sysinfo").unwrap();
        assert_eq!(Value::Object(payload), reply["system"]["get_sysinfo"]);
    }

    #[test]
    fn non_zero_code_is_device_error() {
        let reply = json!({"schedule": {"get_rules": {"err_code": 5, "err_msg": "X"}}});
        let err = extract_payload(&reply, "schedule", "get_rules").unwrap_err();
        match err {
            Error::Device(DeviceError { code, message }) => {
                assert_eq!(code, 5);
                assert_eq!(message, "X");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_message_uses_placeholder() {
        let reply = json!({"system": {"reboot": {"err_code": -1}}});
        let err = extract_payload(&reply, "system", "reboot").unwrap_err();
        assert!(matches!(
            err,
            Error::Device(DeviceError { code: -1, ref message }) if message == "unknown error"
        ));
    }

    #[test]
    fn missing_group_is_protocol_error() {
        let reply = json!({"emeter": {"err_code": -1, "err_msg": "module not support"}});
        let err = extract_payload(&reply, "system", "get_sysinfo").unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::MissingField(_))));
    }

    #[test]
    fn missing_err_code_is_protocol_error() {
        let reply = json!({"system": {"get_sysinfo": {"relay_state": 1}}});
        let err = extract_payload(&reply, "system", "get_sysinfo").unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::MissingField(f)) if f == "err_code"));
    }

    #[test]
    fn non_object_result_is_protocol_error() {
        let reply = json!({"system": {"get_sysinfo": null}});
        let err = extract_payload(&reply, "system", "get_sysinfo").unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::UnexpectedFormat(_))));
    }
}
