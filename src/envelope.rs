//! Wire envelopes for the LAN control protocol.
//!
//! Every exchange is a single JSON datagram shaped
//! `{"msg": {"cmd": <tag>, "data": {...}}}`. The command tag fully
//! determines the payload, so requests and responses are closed sum
//! types keyed on `cmd`; decoding branches on the tag before it ever
//! interprets the payload.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::types::{Brightness, Color, Kelvin, PowerState};

type Result<T> = std::result::Result<T, Error>;

/// Account topic carried by every scan request. A fixed protocol
/// constant, not configuration.
const ACCOUNT_TOPIC: &str = "reserve";

/// The `{"msg": ...}` wrapper common to every message.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<T> {
    pub msg: T,
}

/// Commands sent to lamps.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "cmd", content = "data", rename_all = "camelCase")]
pub enum Request {
    /// Multicast probe soliciting a reply from every lamp on the segment.
    Scan { account_topic: String },
    /// Ask a single lamp for its full state.
    DevStatus {},
    /// Switch a lamp on (1) or off (0).
    Turn { value: u8 },
    /// Set brightness, 0-100.
    Brightness { value: u8 },
    /// Set RGB color or white temperature; a kelvin of 0 means "use the
    /// RGB color", an all-zero color with nonzero kelvin means "use the
    /// temperature".
    Colorwc {
        color: Color,
        #[serde(rename = "colorTemInKelvin")]
        color_tem_in_kelvin: u16,
    },
}

/// Replies received from lamps, keyed on the same command tags.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "cmd", content = "data", rename_all = "camelCase")]
pub enum Response {
    Scan(ScanData),
    DevStatus(StatusData),
}

impl Response {
    /// The command tag this reply carried.
    pub fn cmd(&self) -> &'static str {
        match self {
            Response::Scan(_) => "scan",
            Response::DevStatus(_) => "devStatus",
        }
    }
}

/// Identity block a lamp reports in its scan reply.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanData {
    pub ip: Ipv4Addr,
    pub device: String,
    pub sku: String,
    pub ble_version_hard: String,
    pub ble_version_soft: String,
    pub wifi_version_hard: String,
    pub wifi_version_soft: String,
}

/// Full state block a lamp reports in its devStatus reply.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
    pub on_off: u8,
    pub brightness: u8,
    pub color: Color,
    pub color_tem_in_kelvin: u16,
}

/// Encode the multicast scan probe.
pub fn encode_scan_request() -> Result<Vec<u8>> {
    encode(&Request::Scan {
        account_topic: ACCOUNT_TOPIC.to_string(),
    })
}

/// Encode a status query.
pub fn encode_status_request() -> Result<Vec<u8>> {
    encode(&Request::DevStatus {})
}

/// Encode a power change.
pub fn encode_turn_request(power: PowerState) -> Result<Vec<u8>> {
    encode(&Request::Turn {
        value: power.value(),
    })
}

/// Encode a brightness change.
pub fn encode_brightness_request(brightness: &Brightness) -> Result<Vec<u8>> {
    encode(&Request::Brightness {
        value: brightness.value(),
    })
}

/// Encode an RGB color change.
pub fn encode_color_request(color: &Color) -> Result<Vec<u8>> {
    encode(&Request::Colorwc {
        color: color.clone(),
        color_tem_in_kelvin: 0,
    })
}

/// Encode a white-temperature change.
pub fn encode_color_temperature_request(temp: &Kelvin) -> Result<Vec<u8>> {
    encode(&Request::Colorwc {
        color: Color::new(),
        color_tem_in_kelvin: temp.kelvin(),
    })
}

/// Decode an inbound datagram into a typed reply.
///
/// Malformed JSON, an unknown command tag, or a missing field all fail
/// with [`Error::JsonLoad`]; a reply is never partially decoded.
pub fn decode_response(buf: &[u8]) -> Result<Response> {
    let envelope: Envelope<Response> = serde_json::from_slice(buf).map_err(Error::JsonLoad)?;
    Ok(envelope.msg)
}

/// Decode a scan reply, rejecting any other command tag.
pub fn decode_scan_response(buf: &[u8]) -> Result<ScanData> {
    match decode_response(buf)? {
        Response::Scan(data) => Ok(data),
        other => Err(Error::UnexpectedReply {
            expected: "scan",
            got: other.cmd().to_string(),
        }),
    }
}

/// Decode a status reply, rejecting any other command tag.
pub fn decode_status_response(buf: &[u8]) -> Result<StatusData> {
    match decode_response(buf)? {
        Response::DevStatus(data) => Ok(data),
        other => Err(Error::UnexpectedReply {
            expected: "devStatus",
            got: other.cmd().to_string(),
        }),
    }
}

fn encode(request: &Request) -> Result<Vec<u8>> {
    serde_json::to_vec(&Envelope { msg: request }).map_err(Error::JsonDump)
}
