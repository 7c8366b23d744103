//! # govee_lights_rs
//!
//! An async Rust library for discovering and controlling Govee smart
//! lamps over the vendor's LAN UDP/JSON protocol.
//!
//! The crate speaks the plaintext `{"msg": {"cmd", "data"}}` envelope
//! protocol directly: a multicast scan solicits replies from every lamp
//! on the segment, a per-device status query fills in the lamp's state,
//! and state-change commands (power, brightness, color, temperature)
//! are sent to each lamp's unicast control port. Discovered lamps live
//! in an insertion-ordered [`DeviceRegistry`] suitable for driving a
//! selectable list UI.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use govee_lights_rs::{LanClient, LanController, LanEndpoints};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), govee_lights_rs::Error> {
//!     let client = LanClient::bind(LanEndpoints::default()).await?;
//!     let mut controller = LanController::new(client);
//!
//!     // Collect every lamp answering within the window.
//!     let found = controller.discover(Duration::from_secs(3)).await?;
//!     println!("found {found} lamp(s)");
//!
//!     for device in controller.registry().all() {
//!         println!("  {} {} ({})", device.ip(), device.name(), device.sku());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Communication
//!
//! Lamps listen for scan requests on the multicast group
//! 239.255.255.250:4001 and address replies to port 4002; each lamp
//! accepts status queries and commands on its own port 4003. One UDP
//! socket, bound once and reused for every exchange, carries all
//! traffic. The LAN protocol is plaintext JSON per the vendor spec; the
//! lamp's "LAN control" switch must be enabled in the vendor app.
//!
//! ## Front end
//!
//! The optional `govee-tui` binary (feature `tui`, on by default) renders
//! the registry as a selectable list and toggles the highlighted lamp.

mod client;
mod controller;
mod device;
mod endpoints;
mod envelope;
mod errors;
mod registry;
mod types;

// Re-export public API
pub use client::LanClient;
pub use controller::LanController;
pub use device::{Device, DeviceState};
pub use endpoints::{CONTROL_PORT, LISTEN_PORT, LanEndpoints, MULTICAST_GROUP, SCAN_PORT};
pub use envelope::{
    Envelope, Request, Response, ScanData, StatusData, decode_response, decode_scan_response,
    decode_status_response, encode_brightness_request, encode_color_request,
    encode_color_temperature_request, encode_scan_request, encode_status_request,
    encode_turn_request,
};
pub use errors::Error;
pub use registry::DeviceRegistry;
pub use types::{Brightness, Color, Kelvin, PowerState};
