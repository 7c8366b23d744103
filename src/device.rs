//! Known lamps and their last-observed state.

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::envelope::{ScanData, StatusData};
use crate::errors::Error;
use crate::types::{Brightness, Color, Kelvin, PowerState};

type Result<T> = std::result::Result<T, Error>;

/// Last-observed mutable state of a lamp.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DeviceState {
    pub power: PowerState,
    pub brightness: Brightness,
    pub color: Color,
    /// `None` while the lamp is in RGB mode (it reports a kelvin of 0).
    pub temp: Option<Kelvin>,
}

impl DeviceState {
    /// Build state from a decoded status reply.
    ///
    /// Fails fast on an `onOff` outside {0, 1} instead of coercing it;
    /// brightness and temperature are display data and get clamped.
    pub(crate) fn from_status(status: &StatusData) -> Result<Self> {
        let power = PowerState::from_value(status.on_off)
            .ok_or(Error::InvalidPowerValue(status.on_off))?;
        Ok(DeviceState {
            power,
            brightness: Brightness::create_or(status.brightness),
            color: status.color.clone(),
            temp: match status.color_tem_in_kelvin {
                0 => None,
                k => Some(Kelvin::create_or(k)),
            },
        })
    }
}

/// A lamp known to the registry: scan-derived identity plus the state
/// from its most recent status reply.
///
/// Devices are materialized only from a fully decoded scan + status
/// pair, mutated only through the controller's command methods, and
/// live for the process lifetime.
#[derive(Debug, Serialize, Clone)]
pub struct Device {
    ip: Ipv4Addr,
    name: String,
    sku: String,
    ble_version_hard: String,
    ble_version_soft: String,
    wifi_version_hard: String,
    wifi_version_soft: String,
    state: DeviceState,
}

impl Device {
    /// Merge a scan reply with a status reply into a complete device.
    pub fn from_parts(scan: ScanData, status: &StatusData) -> Result<Self> {
        Ok(Device {
            ip: scan.ip,
            name: scan.device,
            sku: scan.sku,
            ble_version_hard: scan.ble_version_hard,
            ble_version_soft: scan.ble_version_soft,
            wifi_version_hard: scan.wifi_version_hard,
            wifi_version_soft: scan.wifi_version_soft,
            state: DeviceState::from_status(status)?,
        })
    }

    /// IP address; unique key within the registry.
    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn ble_version(&self) -> (&str, &str) {
        (&self.ble_version_hard, &self.ble_version_soft)
    }

    pub fn wifi_version(&self) -> (&str, &str) {
        (&self.wifi_version_hard, &self.wifi_version_soft)
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Replace the state wholesale (status refresh).
    pub(crate) fn set_state(&mut self, state: DeviceState) {
        self.state = state;
    }

    pub(crate) fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_fixture(ip: Ipv4Addr) -> ScanData {
        ScanData {
            ip,
            device: "LampA".to_string(),
            sku: "H6159".to_string(),
            ble_version_hard: "1.00".to_string(),
            ble_version_soft: "1.02".to_string(),
            wifi_version_hard: "1.00".to_string(),
            wifi_version_soft: "1.03".to_string(),
        }
    }

    fn status_fixture() -> StatusData {
        StatusData {
            on_off: 0,
            brightness: 60,
            color: Color::rgb(255, 0, 0),
            color_tem_in_kelvin: 0,
        }
    }

    #[test]
    fn merges_scan_and_status() {
        let ip = Ipv4Addr::new(192, 168, 1, 50);
        let device = Device::from_parts(scan_fixture(ip), &status_fixture()).unwrap();
        assert_eq!(device.ip(), ip);
        assert_eq!(device.name(), "LampA");
        assert_eq!(device.sku(), "H6159");
        assert_eq!(device.ble_version(), ("1.00", "1.02"));
        assert_eq!(device.state().power, PowerState::Off);
        assert_eq!(device.state().brightness.value(), 60);
        assert_eq!(device.state().temp, None);
    }

    #[test]
    fn rejects_out_of_domain_power() {
        let status = StatusData {
            on_off: 3,
            ..status_fixture()
        };
        let err = Device::from_parts(scan_fixture(Ipv4Addr::LOCALHOST), &status).unwrap_err();
        assert_eq!(err, Error::InvalidPowerValue(3));
    }

    #[test]
    fn nonzero_kelvin_means_white_mode() {
        let status = StatusData {
            color_tem_in_kelvin: 2700,
            ..status_fixture()
        };
        let state = DeviceState::from_status(&status).unwrap();
        assert_eq!(state.temp, Some(Kelvin::create(2700).unwrap()));
    }
}
