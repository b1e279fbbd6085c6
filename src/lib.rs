// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hs100` - A Rust library and daemon to control TP-Link HS100/HS110 smart
//! plugs.
//!
//! The plugs speak JSON over TCP port 9999, obfuscated with a XOR autokey
//! cipher. This crate implements the wire protocol, exposes every known
//! command as a typed method on [`Device`], and provides a small daemon that
//! applies request files dropped into a directory and publishes the plug's
//! status to a file.
//!
//! # Supported Features
//!
//! - **Switching**: relay and LED on/off
//! - **Device settings**: alias, MAC, location, icon, firmware download
//! - **Network**: Wi-Fi scan and provisioning, cloud binding
//! - **Rules**: schedule, countdown and anti-theft rule management
//! - **Energy monitoring**: realtime readings and statistics (HS110 only)
//! - **Daemon**: request-file driven control with atomic status publishing
//!
//! # Quick Start
//!
//! ```no_run
//! use hs100::Device;
//!
//! #[tokio::main]
//! async fn main() -> hs100::Result<()> {
//!     // Detect HS100 or HS110 from the feature flags
//!     let device = Device::tcp("192.168.0.20").probe().await?;
//!
//!     device.relay_on().await?;
//!     device.led_off().await?;
//!
//!     let info = device.system_info().await?;
//!     println!("{} relay on: {}", info.alias, info.relay_on());
//!
//!     if device.model().supports_emeter() {
//!         let reading = device.emeter_realtime().await?;
//!         println!("{:?} W", reading.power());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Raw Commands
//!
//! Commands without a typed wrapper can be sent directly:
//!
//! ```no_run
//! use hs100::Device;
//!
//! # async fn example() -> hs100::Result<()> {
//! let device = Device::tcp("192.168.0.20").build();
//! let payload = device.simple_call("system", "get_sysinfo", None).await?;
//! println!("{}", payload["alias"]);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
#[cfg(feature = "daemon")]
pub mod daemon;
mod device;
pub mod error;
mod model;
pub mod protocol;
pub mod response;

pub use command::{
    AntiTheftCommand, AntiTheftRule, CloudCommand, Command, CountdownCommand, CountdownRule,
    EmeterCommand, NetifCommand, RuleAction, ScheduleCommand, ScheduleRule, SystemCommand,
    TimeCommand, TimeOption, Weekdays,
};
pub use config::{Config, DaemonSettings, TcpSettings};
pub use device::{Device, SwitchAction, TcpDeviceBuilder};
#[cfg(feature = "daemon")]
pub use error::DaemonError;
pub use error::{
    ConfigError, DeviceError, Error, ProtocolError, RequestFileError, Result, TransportError,
};
pub use model::DeviceModel;
pub use protocol::{Protocol, TcpClient, TcpConfig};
pub use response::{EnergyReading, Payload, SysInfo};
