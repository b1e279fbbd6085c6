// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request files.
//!
//! A client asks the daemon to switch the plug by moving a file named
//! `request.<millis>` into the requests directory. The suffix is the time
//! the request was made, in milliseconds since the Unix epoch, and the
//! content is `{"relayOn": bool, "ledOn": bool}`.

use std::path::Path;

use serde::Deserialize;

use crate::error::RequestFileError;

/// File name prefix of request files.
pub const REQUEST_PREFIX: &str = "request.";

/// Desired plug state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    /// Whether the relay should be on.
    pub relay_on: bool,
    /// Whether the LED should be on.
    pub led_on: bool,
}

/// A parsed request file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFile {
    /// Request time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Desired plug state.
    pub state: DesiredState,
}

/// Returns whether the path names a request file.
#[must_use]
pub fn is_request_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(REQUEST_PREFIX))
}

/// Parses the timestamp out of a request file name.
///
/// # Errors
///
/// Returns [`RequestFileError::NotARequest`] if the name lacks the prefix and
/// [`RequestFileError::InvalidTimestamp`] if the suffix is not an integer.
pub fn parse_timestamp(path: &Path) -> Result<i64, RequestFileError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = name
        .strip_prefix(REQUEST_PREFIX)
        .ok_or_else(|| RequestFileError::NotARequest(name.clone()))?;
    suffix
        .parse()
        .map_err(|_| RequestFileError::InvalidTimestamp(name.clone()))
}

impl RequestFile {
    /// Reads and parses a request file.
    ///
    /// The name is validated before the file is opened.
    ///
    /// # Errors
    ///
    /// Returns error if the name is invalid, the file cannot be read, or the
    /// content is not a valid request.
    pub async fn read(path: &Path) -> Result<Self, RequestFileError> {
        let timestamp = parse_timestamp(path)?;
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| RequestFileError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let state = serde_json::from_slice(&contents)?;
        Ok(Self { timestamp, state })
    }
}
