//! The registry of discovered lamps.

use std::net::Ipv4Addr;

use indexmap::IndexMap;

use crate::device::Device;

/// Mapping from device IP to [`Device`].
///
/// The single source of truth the presentation layer reads. At most one
/// entry per IP: upserting an already-known IP replaces the entry
/// wholesale without disturbing its position, so iteration order stays
/// stable (insertion order) across refreshes.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: IndexMap<Ipv4Addr, Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for the device's IP.
    pub fn upsert(&mut self, device: Device) {
        self.devices.insert(device.ip(), device);
    }

    pub fn get(&self, ip: Ipv4Addr) -> Option<&Device> {
        self.devices.get(&ip)
    }

    pub(crate) fn get_mut(&mut self, ip: Ipv4Addr) -> Option<&mut Device> {
        self.devices.get_mut(&ip)
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.devices.contains_key(&ip)
    }

    /// All known devices in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
