// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level device abstraction for HS100/HS110 plugs.
//!
//! [`Device`] exposes every operation of the plug as a typed method. All of
//! them are thin wrappers over two primitives: [`Device::call`], which sends
//! a raw envelope, and [`Device::simple_call`], which sends one
//! group/command pair and validates the reply's `err_code`.
//!
//! ```no_run
//! use hs100::Device;
//!
//! # async fn example() -> hs100::Result<()> {
//! let device = Device::tcp("192.168.0.1").build();
//!
//! device.relay_on().await?;
//! let info = device.system_info().await?;
//! println!("{} is {}", info.alias, if info.relay_on() { "on" } else { "off" });
//! # Ok(())
//! # }
//! ```

mod action;
mod tcp_builder;

pub use action::SwitchAction;
pub use tcp_builder::TcpDeviceBuilder;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::command::{
    AntiTheftCommand, AntiTheftRule, CloudCommand, Command, CountdownCommand, CountdownRule,
    EmeterCommand, NetifCommand, ScheduleCommand, ScheduleRule, SystemCommand, TimeCommand,
};
use crate::error::{Error, ProtocolError};
use crate::model::DeviceModel;
use crate::protocol::{Protocol, TcpConfig, envelope};
use crate::response::{EnergyReading, Payload, SysInfo, extract_payload};

/// An HS100/HS110 plug reachable through a [`Protocol`].
#[derive(Debug)]
pub struct Device<P: Protocol> {
    protocol: P,
    model: DeviceModel,
}

impl Device<crate::protocol::TcpClient> {
    /// Starts building a device reached over TCP at `host`.
    #[must_use]
    pub fn tcp(host: impl Into<String>) -> TcpDeviceBuilder {
        TcpDeviceBuilder::new(TcpConfig::new(host))
    }

    /// Starts building a device from a full TCP configuration.
    #[must_use]
    pub fn tcp_config(config: TcpConfig) -> TcpDeviceBuilder {
        TcpDeviceBuilder::new(config)
    }
}

impl<P: Protocol> Device<P> {
    /// Creates a device over the given protocol.
    pub fn new(protocol: P, model: DeviceModel) -> Self {
        Self { protocol, model }
    }

    /// Returns the device model.
    #[must_use]
    pub fn model(&self) -> DeviceModel {
        self.model
    }

    /// Returns the underlying protocol.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Sends a raw envelope and returns the raw reply envelope.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange fails or the reply is not JSON.
    pub async fn call(&self, envelope: &Value) -> Result<Value, Error> {
        self.protocol.call(envelope).await
    }

    /// Sends `{group: {command: data}}` and returns the validated result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the plug reports a non-zero `err_code`,
    /// or a transport/protocol error if the exchange fails.
    pub async fn simple_call(
        &self,
        group: &str,
        command: &str,
        data: Option<Value>,
    ) -> Result<Payload, Error> {
        tracing::debug!(group, command, "Calling device");
        let reply = self.call(&envelope(group, command, data)).await?;
        extract_payload(&reply, group, command)
    }

    /// Sends a typed command and returns the validated result.
    ///
    /// # Errors
    ///
    /// Same as [`simple_call`](Self::simple_call).
    pub async fn execute<C: Command>(&self, command: &C) -> Result<Payload, Error> {
        let (group, name) = (command.group(), command.name());
        tracing::debug!(group, command = name, "Calling device");
        let reply = self.call(&command.envelope()).await?;
        extract_payload(&reply, group, name)
    }

    // ========== System ==========

    /// Queries system information.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails or the reply lacks relay/LED state.
    pub async fn system_info(&self) -> Result<SysInfo, Error> {
        let payload = self.execute(&SystemCommand::GetSysInfo).await?;
        serde_json::from_value(Value::Object(payload))
            .map_err(|e| Error::Protocol(ProtocolError::Json(e)))
    }

    /// Reboots the plug after `delay` seconds.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn reboot(&self, delay: u32) -> Result<Payload, Error> {
        self.execute(&SystemCommand::Reboot { delay }).await
    }

    /// Resets the plug to factory settings after `delay` seconds.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn reset(&self, delay: u32) -> Result<Payload, Error> {
        self.execute(&SystemCommand::Reset { delay }).await
    }

    /// Switches the relay on or off.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_relay(&self, on: bool) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetRelayState(on)).await
    }

    /// Switches the relay on.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn relay_on(&self) -> Result<Payload, Error> {
        self.set_relay(true).await
    }

    /// Switches the relay off.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn relay_off(&self) -> Result<Payload, Error> {
        self.set_relay(false).await
    }

    /// Switches the LED on or off.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_led(&self, on: bool) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetLedOff(!on)).await
    }

    /// Switches the LED on.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn led_on(&self) -> Result<Payload, Error> {
        self.set_led(true).await
    }

    /// Switches the LED off.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn led_off(&self) -> Result<Payload, Error> {
        self.set_led(false).await
    }

    /// Sets the device alias.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_alias(&self, alias: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetAlias(alias.into())).await
    }

    /// Sets the MAC address.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_mac_address(&self, mac: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetMacAddress(mac.into())).await
    }

    /// Sets the device ID.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_device_id(&self, id: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetDeviceId(id.into())).await
    }

    /// Sets the hardware ID.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_hardware_id(&self, id: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetHardwareId(id.into())).await
    }

    /// Sets the geographical location.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_location(&self, longitude: f64, latitude: f64) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetLocation {
            longitude,
            latitude,
        })
        .await
    }

    /// Checks the U-Boot loader.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn test_check_uboot(&self) -> Result<Payload, Error> {
        self.execute(&SystemCommand::TestCheckUboot).await
    }

    /// Queries the device icon.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn icon(&self) -> Result<Payload, Error> {
        self.execute(&SystemCommand::GetIcon).await
    }

    /// Sets the device icon.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_icon(
        &self,
        icon: impl Into<String>,
        hash: impl Into<String>,
    ) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetIcon {
            icon: icon.into(),
            hash: hash.into(),
        })
        .await
    }

    /// Enables or disables test mode.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_test_mode(&self, enable: bool) -> Result<Payload, Error> {
        self.execute(&SystemCommand::SetTestMode(enable)).await
    }

    /// Starts downloading firmware from `url`.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn download_firmware(&self, url: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&SystemCommand::DownloadFirmware(url.into())).await
    }

    /// Queries the firmware download state.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn download_state(&self) -> Result<Payload, Error> {
        self.execute(&SystemCommand::GetDownloadState).await
    }

    /// Flashes the downloaded firmware.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn flash_firmware(&self) -> Result<Payload, Error> {
        self.execute(&SystemCommand::FlashFirmware).await
    }

    /// Checks for a new configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn check_new_config(&self) -> Result<Payload, Error> {
        self.execute(&SystemCommand::CheckNewConfig).await
    }

    // ========== Wi-Fi ==========

    /// Scans for wireless networks.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn scan_wlan(&self, refresh: bool) -> Result<Payload, Error> {
        self.execute(&NetifCommand::GetScanInfo { refresh }).await
    }

    /// Joins the plug to a wireless network.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_wlan(
        &self,
        ssid: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Payload, Error> {
        self.execute(&NetifCommand::SetStationInfo {
            ssid: ssid.into(),
            password: password.into(),
        })
        .await
    }

    // ========== Cloud ==========

    /// Queries cloud settings and status.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn cloud_info(&self) -> Result<Payload, Error> {
        self.execute(&CloudCommand::GetInfo).await
    }

    /// Queries the firmware list from the cloud server.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn cloud_firmware_list(&self) -> Result<Payload, Error> {
        self.execute(&CloudCommand::GetFirmwareList).await
    }

    /// Sets the cloud server URL.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_cloud_server(&self, url: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&CloudCommand::SetServerUrl(url.into())).await
    }

    /// Binds the plug to a cloud account.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn bind_cloud(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Payload, Error> {
        self.execute(&CloudCommand::Bind {
            username: username.into(),
            password: password.into(),
        })
        .await
    }

    /// Unbinds the plug from its cloud account.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn unbind_cloud(&self) -> Result<Payload, Error> {
        self.execute(&CloudCommand::Unbind).await
    }

    // ========== Time ==========

    /// Queries the device clock.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn time(&self) -> Result<Payload, Error> {
        self.execute(&TimeCommand::GetTime).await
    }

    /// Queries the device time zone.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn timezone(&self) -> Result<Payload, Error> {
        self.execute(&TimeCommand::GetTimezone).await
    }

    /// Sets the time zone index and local time.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_timezone(&self, index: u16, at: NaiveDateTime) -> Result<Payload, Error> {
        self.execute(&TimeCommand::SetTimezone { index, at }).await
    }

    /// Sets the time zone index, using the host's current local time.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn set_timezone_now(&self, index: u16) -> Result<Payload, Error> {
        self.set_timezone(index, chrono::Local::now().naive_local()).await
    }

    // ========== Schedule ==========

    /// Queries the next scheduled action.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn next_scheduled_action(&self) -> Result<Payload, Error> {
        self.execute(&ScheduleCommand::GetNextAction).await
    }

    /// Lists the schedule rules.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn schedule_rules(&self) -> Result<Payload, Error> {
        self.execute(&ScheduleCommand::GetRules).await
    }

    /// Adds a schedule rule.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn add_schedule_rule(&self, rule: ScheduleRule) -> Result<Payload, Error> {
        self.execute(&ScheduleCommand::AddRule(rule)).await
    }

    /// Replaces the schedule rule with the given ID.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn edit_schedule_rule(
        &self,
        id: impl Into<String>,
        rule: ScheduleRule,
    ) -> Result<Payload, Error> {
        self.execute(&ScheduleCommand::EditRule {
            id: id.into(),
            rule,
        })
        .await
    }

    /// Deletes the schedule rule with the given ID.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn delete_schedule_rule(&self, id: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&ScheduleCommand::DeleteRule(id.into())).await
    }

    /// Deletes all schedule rules and their statistics.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn delete_all_schedule_rules(&self) -> Result<Payload, Error> {
        self.execute(&ScheduleCommand::DeleteAllRules).await
    }

    // ========== Countdown ==========

    /// Lists the countdown rules.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn countdown_rules(&self) -> Result<Payload, Error> {
        self.execute(&CountdownCommand::GetRules).await
    }

    /// Adds a countdown rule.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn add_countdown_rule(&self, rule: CountdownRule) -> Result<Payload, Error> {
        self.execute(&CountdownCommand::AddRule(rule)).await
    }

    /// Replaces the countdown rule with the given ID.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn edit_countdown_rule(
        &self,
        id: impl Into<String>,
        rule: CountdownRule,
    ) -> Result<Payload, Error> {
        self.execute(&CountdownCommand::EditRule {
            id: id.into(),
            rule,
        })
        .await
    }

    /// Deletes the countdown rule with the given ID.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn delete_countdown_rule(&self, id: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&CountdownCommand::DeleteRule(id.into())).await
    }

    /// Deletes all countdown rules.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn delete_all_countdown_rules(&self) -> Result<Payload, Error> {
        self.execute(&CountdownCommand::DeleteAllRules).await
    }

    // ========== Anti-theft ==========

    /// Lists the anti-theft rules.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn anti_theft_rules(&self) -> Result<Payload, Error> {
        self.execute(&AntiTheftCommand::GetRules).await
    }

    /// Adds an anti-theft rule.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn add_anti_theft_rule(&self, rule: AntiTheftRule) -> Result<Payload, Error> {
        self.execute(&AntiTheftCommand::AddRule(rule)).await
    }

    /// Replaces the anti-theft rule with the given ID.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn edit_anti_theft_rule(
        &self,
        id: impl Into<String>,
        rule: AntiTheftRule,
    ) -> Result<Payload, Error> {
        self.execute(&AntiTheftCommand::EditRule {
            id: id.into(),
            rule,
        })
        .await
    }

    /// Deletes the anti-theft rule with the given ID.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn delete_anti_theft_rule(&self, id: impl Into<String>) -> Result<Payload, Error> {
        self.execute(&AntiTheftCommand::DeleteRule(id.into())).await
    }

    /// Deletes all anti-theft rules.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub async fn delete_all_anti_theft_rules(&self) -> Result<Payload, Error> {
        self.execute(&AntiTheftCommand::DeleteAllRules).await
    }

    // ========== Energy meter ==========

    async fn emeter(&self, command: EmeterCommand) -> Result<Payload, Error> {
        if !self.model.supports_emeter() {
            return Err(Error::CapabilityNotSupported("energy metering"));
        }
        self.execute(&command).await
    }

    /// Queries the realtime energy reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] on an HS100, or error if the
    /// command fails.
    pub async fn emeter_realtime(&self) -> Result<EnergyReading, Error> {
        let payload = self.emeter(EmeterCommand::GetRealtime).await?;
        serde_json::from_value(Value::Object(payload))
            .map_err(|e| Error::Protocol(ProtocolError::Json(e)))
    }

    /// Queries the voltage and current gain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] on an HS100, or error if the
    /// command fails.
    pub async fn emeter_gain(&self) -> Result<Payload, Error> {
        self.emeter(EmeterCommand::GetGain).await
    }

    /// Sets the voltage and current gain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] on an HS100, or error if the
    /// command fails.
    pub async fn set_emeter_gain(&self, vgain: u32, igain: u32) -> Result<Payload, Error> {
        self.emeter(EmeterCommand::SetGain { vgain, igain }).await
    }

    /// Starts calibrating the energy meter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] on an HS100, or error if the
    /// command fails.
    pub async fn start_emeter_calibration(
        &self,
        vtarget: u32,
        itarget: u32,
    ) -> Result<Payload, Error> {
        self.emeter(EmeterCommand::StartCalibration { vtarget, itarget }).await
    }

    /// Queries per-day statistics for a month.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] on an HS100, or error if the
    /// command fails.
    pub async fn emeter_daily_stats(&self, year: i32, month: u32) -> Result<Payload, Error> {
        self.emeter(EmeterCommand::GetDailyStats { year, month }).await
    }

    /// Queries per-month statistics for a year.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] on an HS100, or error if the
    /// command fails.
    pub async fn emeter_monthly_stats(&self, year: i32) -> Result<Payload, Error> {
        self.emeter(EmeterCommand::GetMonthlyStats { year }).await
    }

    /// Erases all energy statistics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] on an HS100, or error if the
    /// command fails.
    pub async fn erase_emeter_stats(&self) -> Result<Payload, Error> {
        self.emeter(EmeterCommand::EraseStats).await
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::error::DeviceError;

    /// Answers every command of the request with `reply` and records the request.
    struct EchoProtocol {
        requests: Mutex<Vec<Value>>,
        reply: Value,
    }

    impl EchoProtocol {
        fn new() -> Self {
            Self::with_reply(json!({"err_code": 0}))
        }

        fn with_reply(reply: Value) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                reply,
            }
        }
    }

    impl Protocol for EchoProtocol {
        async fn call(&self, envelope: &Value) -> Result<Value, Error> {
            self.requests.lock().push(envelope.clone());
            let (group, commands) = envelope
                .as_object()
                .and_then(|groups| groups.iter().next())
                .expect("envelope has a group");
            let mut results = serde_json::Map::new();
            for name in commands.as_object().expect("group has commands").keys() {
                results.insert(name.clone(), self.reply.clone());
            }
            Ok(json!({ group: results }))
        }
    }

    fn device(model: DeviceModel) -> Device<EchoProtocol> {
        Device::new(EchoProtocol::new(), model)
    }

    #[tokio::test]
    async fn led_on_sends_inverted_flag() {
        let device = device(DeviceModel::Hs100);
        device.led_on().await.unwrap();
        assert_eq!(
            device.protocol().requests.lock()[0],
            json!({"system": {"set_led_off": {"off": 0}}})
        );
    }

    #[tokio::test]
    async fn simple_call_returns_payload() {
        let device = device(DeviceModel::Hs100);
        let payload = device.simple_call("cnCloud", "get_info", None).await.unwrap();
        assert_eq!(payload["err_code"], 0);
        assert_eq!(
            device.protocol().requests.lock()[0],
            json!({"cnCloud": {"get_info": null}})
        );
    }

    #[tokio::test]
    async fn emeter_requires_metered_model() {
        let device = device(DeviceModel::Hs100);
        let err = device.emeter_gain().await.unwrap_err();
        assert!(matches!(err, Error::CapabilityNotSupported(_)));
        assert!(device.protocol().requests.lock().is_empty());
    }

    #[tokio::test]
    async fn emeter_realtime_on_hs110() {
        let device = Device::new(
            EchoProtocol::with_reply(json!({
                "err_code": 0, "voltage_mv": 229000, "power_mw": 5000
            })),
            DeviceModel::Hs110,
        );
        let reading = device.emeter_realtime().await.unwrap();
        assert_eq!(reading.voltage(), Some(229.0));
        assert_eq!(reading.power(), Some(5.0));
    }

    #[tokio::test]
    async fn delete_all_schedule_rules_reads_primary_reply() {
        let device = device(DeviceModel::Hs100);
        device.delete_all_schedule_rules().await.unwrap();
        let sent = device.protocol().requests.lock()[0].clone();
        assert!(sent["schedule"]["erase_runtime_stat"].is_null());
        assert!(sent["schedule"].get("erase_runtime_stat").is_some());
    }

    struct FailingProtocol;

    impl Protocol for FailingProtocol {
        async fn call(&self, _envelope: &Value) -> Result<Value, Error> {
            Ok(json!({
                "system": {"set_dev_alias": {"err_code": -3, "err_msg": "invalid argument"}}
            }))
        }
    }

    #[tokio::test]
    async fn device_error_is_surfaced() {
        let device = Device::new(FailingProtocol, DeviceModel::Hs100);
        let err = device.set_alias("x").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Device(DeviceError { code: -3, .. })
        ));
    }
}
