// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Energy meter reply parsing.

use serde::Deserialize;

/// Realtime reading returned by `emeter.get_realtime`.
///
/// Hardware version 1 reports volts, amps, watts and kWh as floats; version
/// 2 reports integer millivolts, milliamps, milliwatts and watt-hours. The
/// accessors normalise both to base units.
///
/// # Examples
///
/// ```
/// use hs100::response::EnergyReading;
///
/// let v1: EnergyReading = serde_json::from_str(
///     r#"{"voltage": 230.5, "current": 0.2, "power": 46.1, "total": 1.25, "err_code": 0}"#,
/// ).unwrap();
/// assert_eq!(v1.power(), Some(46.1));
///
/// let v2: EnergyReading = serde_json::from_str(
///     r#"{"voltage_mv": 230500, "current_ma": 200, "power_mw": 46100, "total_wh": 1250}"#,
/// ).unwrap();
/// assert_eq!(v2.total(), Some(1.25));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnergyReading {
    voltage: Option<f64>,
    current: Option<f64>,
    power: Option<f64>,
    total: Option<f64>,
    voltage_mv: Option<f64>,
    current_ma: Option<f64>,
    power_mw: Option<f64>,
    total_wh: Option<f64>,
}

impl EnergyReading {
    /// Returns the voltage in volts.
    #[must_use]
    pub fn voltage(&self) -> Option<f64> {
        self.voltage.or(self.voltage_mv.map(|mv| mv / 1000.0))
    }

    /// Returns the current in amperes.
    #[must_use]
    pub fn current(&self) -> Option<f64> {
        self.current.or(self.current_ma.map(|ma| ma / 1000.0))
    }

    /// Returns the power in watts.
    #[must_use]
    pub fn power(&self) -> Option<f64> {
        self.power.or(self.power_mw.map(|mw| mw / 1000.0))
    }

    /// Returns the total consumption in kWh.
    #[must_use]
    pub fn total(&self) -> Option<f64> {
        self.total.or(self.total_wh.map(|wh| wh / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_one_fields() {
        let json = r#"{"voltage": 231.0, "current": 0.5, "power": 115.5, "total": 3.0}"#;
        let reading: EnergyReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.voltage(), Some(231.0));
        assert_eq!(reading.current(), Some(0.5));
        assert_eq!(reading.total(), Some(3.0));
    }

    #[test]
    fn version_two_fields() {
        let reading: EnergyReading = serde_json::from_str(
            r#"{"voltage_mv": 231000, "current_ma": 500, "power_mw": 115500, "total_wh": 3000}"#,
        )
        .unwrap();
        assert_eq!(reading.voltage(), Some(231.0));
        assert_eq!(reading.current(), Some(0.5));
        assert_eq!(reading.power(), Some(115.5));
        assert_eq!(reading.total(), Some(3.0));
    }

    #[test]
    fn empty_reading() {
        let reading: EnergyReading = serde_json::from_str(r#"{"err_code": 0}"#).unwrap();
        assert_eq!(reading.power(), None);
    }
}
