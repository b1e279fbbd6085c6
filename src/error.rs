// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `hs100` library.
//!
//! Failures are split by where they happen: the TCP exchange itself
//! ([`TransportError`]), an undecodable or malformed reply
//! ([`ProtocolError`]), a non-zero `err_code` reported by the plug
//! ([`DeviceError`]) and a bad request file handed to the daemon
//! ([`RequestFileError`]).

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Connecting to or exchanging bytes with the plug failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The reply could not be decoded or did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The plug rejected the command.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A request file could not be used.
    #[error("request file error: {0}")]
    RequestFile(#[from] RequestFileError),

    /// The device model does not support the requested command group.
    #[error("device does not support {0}")]
    CapabilityNotSupported(&'static str),
}

/// Errors raised while talking to the plug over TCP.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The TCP connection could not be established.
    #[error("connection to {address} failed: {source}")]
    ConnectionFailed {
        /// The `host:port` that was dialed.
        address: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Sending or receiving failed on an established connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connect or read did not finish in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

/// Errors related to the content of a reply.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The decoded reply is not valid JSON (garbled or truncated frame).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An expected key is missing from the reply envelope.
    #[error("missing field in reply: {0}")]
    MissingField(String),

    /// The reply envelope has an unexpected shape.
    #[error("unexpected reply format: {0}")]
    UnexpectedFormat(String),
}

/// A non-zero `err_code` returned by the plug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("device error {code}: {message}")]
pub struct DeviceError {
    /// The device's `err_code`.
    pub code: i64,
    /// The device's `err_msg`.
    pub message: String,
}

/// Errors related to request files dropped into the requests directory.
#[derive(Debug, Error)]
pub enum RequestFileError {
    /// The file name does not carry the `request.` prefix.
    #[error("not a request file: {0}")]
    NotARequest(String),

    /// The part after `request.` is not a millisecond timestamp.
    #[error("invalid request timestamp in {0}")]
    InvalidTimestamp(String),

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the request file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The content is not a `{ "relayOn": bool, "ledOn": bool }` object.
    #[error("invalid request content: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the long-running daemon outside of device calls.
#[cfg(feature = "daemon")]
#[derive(Debug, Error)]
pub enum DaemonError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The directory watcher could not be set up.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// The status snapshot could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A device call failed.
    #[error(transparent)]
    Device(#[from] Error),
}

#[cfg(feature = "daemon")]
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}

/// Errors related to loading and validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value required for the requested operation is not set.
    #[error("{0} is missing")]
    Missing(&'static str),

    /// A duration that must be positive is set to zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl ConfigError {
    /// Returns the process exit code for this error.
    ///
    /// Missing values map to distinct codes:
    /// 2 for the address, 3 for the requests directory, 4 for the status file.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Missing("address") => 2,
            Self::Missing("requests directory") => 3,
            Self::Missing("status file") => 4,
            _ => 1,
        }
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_display() {
        let err = DeviceError {
            code: -3,
            message: "invalid argument".to_string(),
        };
        assert_eq!(err.to_string(), "device error -3: invalid argument");
    }

    #[test]
    fn error_from_device_error_is_transparent() {
        let err: Error = DeviceError {
            code: 5,
            message: "X".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Device(DeviceError { code: 5, .. })));
        assert_eq!(err.to_string(), "device error 5: X");
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::MissingField("err_code".to_string());
        assert_eq!(err.to_string(), "missing field in reply: err_code");
    }

    #[test]
    fn request_file_error_display() {
        let err = RequestFileError::NotARequest("ignore.1".to_string());
        assert_eq!(err.to_string(), "not a request file: ignore.1");
    }

    #[test]
    fn config_error_exit_codes() {
        assert_eq!(ConfigError::Missing("address").exit_code(), 2);
        assert_eq!(ConfigError::Missing("requests directory").exit_code(), 3);
        assert_eq!(ConfigError::Missing("status file").exit_code(), 4);
        assert_eq!(ConfigError::Zero("timeout").exit_code(), 1);
    }
}
