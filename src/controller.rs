//! Discovery-and-control engine coupling the transport to the registry.

use std::net::Ipv4Addr;
use std::time::Duration;

use log::warn;

use crate::client::LanClient;
use crate::device::{Device, DeviceState};
use crate::envelope;
use crate::errors::Error;
use crate::registry::DeviceRegistry;
use crate::types::{Brightness, Color, Kelvin, PowerState};

type Result<T> = std::result::Result<T, Error>;

/// Drives the scan → status → command lifecycle against the registry.
///
/// Every command method is optimistic and atomic: the registry entry is
/// mutated only after the send succeeds, and only in the field the
/// command targets. On any failure the entry is left untouched.
#[derive(Debug)]
pub struct LanController {
    client: LanClient,
    registry: DeviceRegistry,
}

impl LanController {
    pub fn new(client: LanClient) -> Self {
        LanController {
            client,
            registry: DeviceRegistry::new(),
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Scan the segment and materialize a [`Device`] for every lamp that
    /// answers both the scan and the follow-up status query.
    ///
    /// A lamp that answers the scan but fails the status exchange is
    /// skipped with a warning so one dead device cannot hide the rest of
    /// the segment. Returns the number of devices merged into the
    /// registry.
    pub async fn discover(&mut self, window: Duration) -> Result<usize> {
        let replies = self.client.discover(window).await?;
        let mut merged = 0;

        for scan in replies {
            let ip = scan.ip;
            let status = match self.client.fetch_status(ip).await {
                Ok(status) => status,
                Err(err) => {
                    warn!("skipping {ip}: status query failed: {err}");
                    continue;
                }
            };
            match Device::from_parts(scan, &status) {
                Ok(device) => {
                    self.registry.upsert(device);
                    merged += 1;
                }
                Err(err) => warn!("skipping {ip}: {err}"),
            }
        }

        Ok(merged)
    }

    /// Re-fetch one lamp's status and replace its recorded state
    /// wholesale.
    pub async fn refresh_status(&mut self, ip: Ipv4Addr) -> Result<()> {
        if !self.registry.contains(ip) {
            return Err(Error::DeviceNotFound(ip));
        }
        let status = self.client.fetch_status(ip).await?;
        let state = DeviceState::from_status(&status)?;
        if let Some(device) = self.registry.get_mut(ip) {
            device.set_state(state);
        }
        Ok(())
    }

    /// Flip the recorded power state of one lamp.
    ///
    /// The target value is the complement of the registry's recorded
    /// state; the lamp does not acknowledge, so the registry is updated
    /// optimistically once the send succeeds. Returns the new state.
    pub async fn toggle_power(&mut self, ip: Ipv4Addr) -> Result<PowerState> {
        let current = self
            .registry
            .get(ip)
            .ok_or(Error::DeviceNotFound(ip))?
            .state()
            .power;
        let target = !current;

        let request = envelope::encode_turn_request(target)?;
        self.client.send_command(ip, &request, "turn send").await?;

        if let Some(device) = self.registry.get_mut(ip) {
            device.state_mut().power = target;
        }
        Ok(target)
    }

    /// Set one lamp's brightness.
    pub async fn set_brightness(&mut self, ip: Ipv4Addr, brightness: Brightness) -> Result<()> {
        if !self.registry.contains(ip) {
            return Err(Error::DeviceNotFound(ip));
        }
        let request = envelope::encode_brightness_request(&brightness)?;
        self.client
            .send_command(ip, &request, "brightness send")
            .await?;

        if let Some(device) = self.registry.get_mut(ip) {
            device.state_mut().brightness = brightness;
        }
        Ok(())
    }

    /// Put one lamp in RGB mode with the given color.
    pub async fn set_color(&mut self, ip: Ipv4Addr, color: Color) -> Result<()> {
        if !self.registry.contains(ip) {
            return Err(Error::DeviceNotFound(ip));
        }
        let request = envelope::encode_color_request(&color)?;
        self.client
            .send_command(ip, &request, "colorwc send")
            .await?;

        if let Some(device) = self.registry.get_mut(ip) {
            let state = device.state_mut();
            state.color = color;
            state.temp = None;
        }
        Ok(())
    }

    /// Put one lamp in white mode at the given temperature.
    pub async fn set_color_temperature(&mut self, ip: Ipv4Addr, temp: Kelvin) -> Result<()> {
        if !self.registry.contains(ip) {
            return Err(Error::DeviceNotFound(ip));
        }
        let request = envelope::encode_color_temperature_request(&temp)?;
        self.client
            .send_command(ip, &request, "colorwc send")
            .await?;

        if let Some(device) = self.registry.get_mut(ip) {
            device.state_mut().temp = Some(temp);
        }
        Ok(())
    }
}
