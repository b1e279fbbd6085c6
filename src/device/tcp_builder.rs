// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP device builder.

use std::time::Duration;

use crate::device::Device;
use crate::error::Error;
use crate::model::DeviceModel;
use crate::protocol::{TcpClient, TcpConfig};

/// Builder for devices reached over TCP.
///
/// Created with `Device::tcp("host")` or `Device::tcp_config(config)`.
///
/// # Examples
///
/// ```no_run
/// use hs100::{Device, DeviceModel};
/// use std::time::Duration;
///
/// # async fn example() -> hs100::Result<()> {
/// // Model known up front, no network access
/// let device = Device::tcp("192.168.0.1")
///     .with_model(DeviceModel::Hs110)
///     .with_timeout(Duration::from_secs(2))
///     .build();
///
/// // Model detected from the feature flags
/// let device = Device::tcp("192.168.0.2").probe().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TcpDeviceBuilder {
    config: TcpConfig,
    model: DeviceModel,
}

impl TcpDeviceBuilder {
    pub(crate) fn new(config: TcpConfig) -> Self {
        Self {
            config,
            model: DeviceModel::default(),
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Sets the connect and read timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Sets the device model.
    #[must_use]
    pub fn with_model(mut self, model: DeviceModel) -> Self {
        self.model = model;
        self
    }

    /// Builds the device without contacting it.
    #[must_use]
    pub fn build(self) -> Device<TcpClient> {
        Device::new(self.config.into_client(), self.model)
    }

    /// Builds the device, detecting the model from its system information.
    ///
    /// # Errors
    ///
    /// Returns error if the system information cannot be queried.
    pub async fn probe(self) -> Result<Device<TcpClient>, Error> {
        let mut device = self.build();
        let info = device.system_info().await?;
        device.model = DeviceModel::from_sysinfo(&info);
        tracing::debug!(model = %device.model, alias = %info.alias, "Detected device model");
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let device = Device::tcp("192.168.0.1").build();
        assert_eq!(device.model(), DeviceModel::Hs100);
        assert_eq!(device.protocol().config().port(), 9999);
    }

    #[test]
    fn builder_with_all_options() {
        let device = Device::tcp("plug")
            .with_port(10001)
            .with_timeout(Duration::from_secs(1))
            .with_model(DeviceModel::Hs110)
            .build();
        assert_eq!(device.model(), DeviceModel::Hs110);
        assert_eq!(device.protocol().config().address(), "plug:10001");
        assert_eq!(device.protocol().config().timeout(), Duration::from_secs(1));
    }

    #[test]
    fn builder_from_config() {
        let device = Device::tcp_config(TcpConfig::new("10.1.1.1").with_port(9)).build();
        assert_eq!(device.protocol().config().address(), "10.1.1.1:9");
    }
}
