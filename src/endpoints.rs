//! Fixed network endpoints of the LAN control protocol.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Multicast group the lamps listen on for scan requests.
pub const MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// Port the multicast scan request is sent to.
pub const SCAN_PORT: u16 = 4001;

/// Port lamps address their replies to.
pub const LISTEN_PORT: u16 = 4002;

/// Per-device unicast port for status queries and commands.
pub const CONTROL_PORT: u16 = 4003;

/// The three resolved endpoints every exchange uses.
///
/// Constructed once and handed to [`LanClient`](crate::LanClient); there is
/// no global address state. [`LanEndpoints::default`] yields the vendor
/// constants, [`LanEndpoints::resolve`] accepts string overrides (useful
/// for pointing the client at a simulated lamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanEndpoints {
    /// Where the scan request is sent (multicast).
    pub scan_target: SocketAddr,
    /// Local bind address for the shared reply listener.
    pub listener: SocketAddr,
    /// Unicast port each device accepts status/control datagrams on.
    pub control_port: u16,
}

impl Default for LanEndpoints {
    fn default() -> Self {
        LanEndpoints {
            scan_target: SocketAddr::V4(SocketAddrV4::new(MULTICAST_GROUP, SCAN_PORT)),
            listener: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, LISTEN_PORT)),
            control_port: CONTROL_PORT,
        }
    }
}

impl LanEndpoints {
    /// Resolve endpoints from their string forms.
    ///
    /// Fails with [`Error::AddressResolution`] if either address does not
    /// parse; the protocol cannot proceed without its endpoints, so
    /// callers treat this as fatal.
    pub fn resolve(scan_target: &str, listener: &str, control_port: u16) -> Result<Self> {
        let scan_target = scan_target
            .parse()
            .map_err(|e| Error::address_resolution(scan_target, e))?;
        let listener = listener
            .parse()
            .map_err(|e| Error::address_resolution(listener, e))?;
        Ok(LanEndpoints {
            scan_target,
            listener,
            control_port,
        })
    }

    /// The unicast control endpoint of a single device.
    pub fn control_endpoint(&self, ip: Ipv4Addr) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(ip, self.control_port))
    }

    /// The multicast group to join on the listener socket, if the scan
    /// target is a multicast address.
    pub(crate) fn multicast_group(&self) -> Option<Ipv4Addr> {
        match self.scan_target {
            SocketAddr::V4(v4) if v4.ip().is_multicast() => Some(*v4.ip()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_use_vendor_constants() {
        let eps = LanEndpoints::default();
        assert_eq!(eps.scan_target.to_string(), "239.255.255.250:4001");
        assert_eq!(eps.listener.to_string(), "0.0.0.0:4002");
        assert_eq!(eps.control_port, 4003);
        assert_eq!(eps.multicast_group(), Some(MULTICAST_GROUP));
    }

    #[test]
    fn control_endpoint_targets_device_ip() {
        let eps = LanEndpoints::default();
        let addr = eps.control_endpoint(Ipv4Addr::new(192, 168, 1, 50));
        assert_eq!(addr.to_string(), "192.168.1.50:4003");
    }

    #[test]
    fn resolve_rejects_garbage() {
        let err = LanEndpoints::resolve("not-an-address", "0.0.0.0:4002", 4003).unwrap_err();
        assert!(matches!(err, Error::AddressResolution { .. }));

        let err = LanEndpoints::resolve("239.255.255.250:4001", "nope", 4003).unwrap_err();
        assert!(matches!(err, Error::AddressResolution { .. }));
    }

    #[test]
    fn loopback_endpoints_skip_multicast() {
        let eps = LanEndpoints::resolve("127.0.0.1:9001", "127.0.0.1:0", 9003).unwrap();
        assert_eq!(eps.multicast_group(), None);
    }
}
