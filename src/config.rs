// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration file handling.
//!
//! The configuration is a TOML file with a `[device]` and a `[daemon]`
//! table. Every value can also be given on the command line, which takes
//! precedence.
//!
//! ```toml
//! [device]
//! address = "192.168.0.20"
//! port = 9999
//!
//! [daemon]
//! requestsDir = "/var/lib/hs100/requests"
//! statusFile = "/var/lib/hs100/status.json"
//! pidFile = "/run/hs100.pid"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::protocol::TcpConfig;

/// Default interval of the idle status refresh.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// How to reach the plug.
    pub device: DeviceSection,
    /// Where the daemon reads requests and writes its status.
    pub daemon: DaemonSection,
}

/// The `[device]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeviceSection {
    /// Host name or IP address of the plug.
    pub address: Option<String>,
    /// TCP port of the plug.
    pub port: u16,
    /// Connect and read timeout in seconds.
    pub timeout: u64,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            address: None,
            port: TcpConfig::DEFAULT_PORT,
            timeout: TcpConfig::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// The `[daemon]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DaemonSection {
    /// Directory request files are moved into.
    pub requests_dir: Option<PathBuf>,
    /// File the status snapshot is published to.
    pub status_file: Option<PathBuf>,
    /// File the process ID is written to.
    pub pid_file: Option<PathBuf>,
    /// Seconds without requests before the status is refreshed.
    pub idle_timeout: u64,
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            requests_dir: None,
            status_file: None,
            pid_file: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT.as_secs(),
        }
    }
}

/// Validated settings the daemon runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSettings {
    /// How to reach the plug.
    pub device: TcpSettings,
    /// Directory request files are moved into.
    pub requests_dir: PathBuf,
    /// File the status snapshot is published to.
    pub status_file: PathBuf,
    /// File the process ID is written to.
    pub pid_file: Option<PathBuf>,
    /// Interval of the idle status refresh.
    pub idle_timeout: Duration,
}

/// Validated connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpSettings {
    /// Host name or IP address of the plug.
    pub address: String,
    /// TCP port of the plug.
    pub port: u16,
    /// Connect and read timeout.
    pub timeout: Duration,
}

impl TcpSettings {
    /// Converts to a transport configuration.
    #[must_use]
    pub fn to_tcp_config(&self) -> TcpConfig {
        TcpConfig::new(self.address.clone())
            .with_port(self.port)
            .with_timeout(self.timeout)
    }
}

impl Config {
    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses the configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid configuration.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Returns the connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if no address is configured, or
    /// [`ConfigError::Zero`] if the timeout is zero.
    pub fn tcp_settings(&self) -> Result<TcpSettings, ConfigError> {
        let address = self
            .device
            .address
            .clone()
            .ok_or(ConfigError::Missing("address"))?;
        Ok(TcpSettings {
            address,
            port: self.device.port,
            timeout: positive_secs(self.device.timeout, "timeout")?,
        })
    }

    /// Returns the daemon settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for the first required value that is
    /// not configured: address, requests directory, status file. Returns
    /// [`ConfigError::Zero`] if a timeout is zero.
    pub fn daemon_settings(&self) -> Result<DaemonSettings, ConfigError> {
        let device = self.tcp_settings()?;
        let requests_dir = self
            .daemon
            .requests_dir
            .clone()
            .ok_or(ConfigError::Missing("requests directory"))?;
        let status_file = self
            .daemon
            .status_file
            .clone()
            .ok_or(ConfigError::Missing("status file"))?;

        Ok(DaemonSettings {
            device,
            requests_dir,
            status_file,
            pid_file: self.daemon.pid_file.clone(),
            idle_timeout: positive_secs(self.daemon.idle_timeout, "idle timeout")?,
        })
    }
}

/// A zero timeout would fail every exchange and spin the idle refresh.
fn positive_secs(secs: u64, name: &'static str) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Zero(name));
    }
    Ok(Duration::from_secs(secs))
}
