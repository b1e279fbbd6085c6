// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status file publishing.
//!
//! The status file is replaced as a whole: the new snapshot is written to
//! `<status file>.new` and then renamed over the published path, so readers
//! see either the previous snapshot or the new one.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::{DaemonError, io_err};
use crate::protocol::Protocol;

/// Suffix of the staging file written before the rename.
pub const STAGING_SUFFIX: &str = ".new";

/// Published plug status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Timestamp of the last processed request, in milliseconds since the
    /// Unix epoch (0 before the first request).
    pub last_request: i64,
    /// Time the snapshot was taken, in milliseconds since the Unix epoch.
    pub updated: i64,
    /// Whether the relay is on.
    pub relay_on: bool,
    /// Whether the LED is on.
    pub led_on: bool,
}

/// Writes status snapshots to a file.
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    /// Creates a store publishing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the published path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the staging path.
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(STAGING_SUFFIX);
        PathBuf::from(name)
    }

    /// Queries the plug and publishes a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the plug cannot be queried or the file cannot be
    /// written.
    pub async fn try_refresh<P: Protocol>(
        &self,
        device: &Device<P>,
        last_request: i64,
    ) -> Result<StatusSnapshot, DaemonError> {
        let info = device.system_info().await?;
        let snapshot = StatusSnapshot {
            last_request,
            updated: Utc::now().timestamp_millis(),
            relay_on: info.relay_on(),
            led_on: info.led_on(),
        };
        self.write(&snapshot).await?;
        tracing::debug!(
            relay_on = snapshot.relay_on,
            led_on = snapshot.led_on,
            last_request,
            "Published status"
        );
        Ok(snapshot)
    }

    /// Like [`try_refresh`](Self::try_refresh), but logs failures instead of
    /// returning them.
    pub async fn refresh<P: Protocol>(
        &self,
        device: &Device<P>,
        last_request: i64,
    ) -> Option<StatusSnapshot> {
        match self.try_refresh(device, last_request).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "Status refresh failed");
                None
            }
        }
    }

    /// Atomically replaces the status file with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns error if the staging file cannot be written or renamed.
    pub async fn write(&self, snapshot: &StatusSnapshot) -> Result<(), DaemonError> {
        let staging = self.stage(snapshot).await?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| io_err(&self.path, e))
    }

    /// Reads the published snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub async fn read(&self) -> Result<StatusSnapshot, DaemonError> {
        let contents = tokio::fs::read(&self.path)
            .await
            .map_err(|e| io_err(&self.path, e))?;
        Ok(serde_json::from_slice(&contents)?)
    }

    async fn stage(&self, snapshot: &StatusSnapshot) -> Result<PathBuf, DaemonError> {
        let staging = self.staging_path();
        let json = serde_json::to_vec(snapshot)?;
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| io_err(&staging, e))?;
        Ok(staging)
    }
}
