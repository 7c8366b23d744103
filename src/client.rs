//! Shared-socket UDP transport.
//!
//! One socket, bound once to the reply-listener endpoint and joined to
//! the scan multicast group, carries every exchange: the multicast scan,
//! per-device status queries, and command sends. It is the sole inbound
//! receive point and is closed when the client drops, on every exit
//! path. Replies carry no correlation id, so exchange methods take
//! `&mut self` and a second request can never be in flight before the
//! first reply (or its timeout) resolves.

use std::net::Ipv4Addr;
use std::time::Duration;

use indexmap::IndexMap;
use log::debug;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout};

use crate::endpoints::LanEndpoints;
use crate::envelope::{self, ScanData, StatusData};
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// UDP client for the lamp control protocol.
#[derive(Debug)]
pub struct LanClient {
    socket: UdpSocket,
    endpoints: LanEndpoints,
    reply_timeout: Duration,
}

impl LanClient {
    /// Fixed receive buffer; no protocol datagram exceeds this.
    pub const RECV_BUFFER: usize = 512;

    /// Default bound on a single request/reply exchange.
    pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

    /// Default window for collecting scan replies.
    pub const DEFAULT_DISCOVERY_WINDOW: Duration = Duration::from_secs(3);

    /// Receive slices inside the discovery window, so the overall
    /// deadline is checked at least this often.
    const RECV_SLICE: Duration = Duration::from_millis(500);

    /// Bind the shared listener socket and join the scan multicast group.
    ///
    /// A bind failure is fatal to the session; nothing else in the
    /// protocol can proceed without the listener.
    pub async fn bind(endpoints: LanEndpoints) -> Result<Self> {
        let socket = UdpSocket::bind(endpoints.listener)
            .await
            .map_err(|e| Error::socket("bind", e))?;

        if let Some(group) = endpoints.multicast_group() {
            socket
                .join_multicast_v4(group, Ipv4Addr::UNSPECIFIED)
                .map_err(|e| Error::socket("join_multicast", e))?;
        }

        Ok(LanClient {
            socket,
            endpoints,
            reply_timeout: Self::DEFAULT_REPLY_TIMEOUT,
        })
    }

    pub fn endpoints(&self) -> &LanEndpoints {
        &self.endpoints
    }

    /// Override the per-exchange reply bound.
    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Send one scan request and collect every reply arriving within the
    /// window.
    ///
    /// Each distinct responder IP yields one [`ScanData`], ordered by
    /// arrival; later datagrams for an already-seen IP are ignored.
    /// Datagrams that do not decode as scan replies (unrelated LAN
    /// chatter on the listener port) are skipped. The window elapsing is
    /// the normal exit; zero responders is an empty vec, not an error.
    pub async fn discover(&mut self, window: Duration) -> Result<Vec<ScanData>> {
        let request = envelope::encode_scan_request()?;
        debug!("sending scan request to {}", self.endpoints.scan_target);
        self.socket
            .send_to(&request, self.endpoints.scan_target)
            .await
            .map_err(|e| Error::socket("scan send", e))?;

        let mut found: IndexMap<Ipv4Addr, ScanData> = IndexMap::new();
        let deadline = Instant::now() + window;
        let mut buf = [0u8; Self::RECV_BUFFER];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match timeout(remaining.min(Self::RECV_SLICE), self.socket.recv_from(&mut buf)).await {
                Ok(Ok((size, addr))) => match envelope::decode_scan_response(&buf[..size]) {
                    Ok(data) => {
                        if found.contains_key(&data.ip) {
                            debug!("duplicate scan reply from {}", data.ip);
                        } else {
                            debug!("scan reply from {addr}: {} ({})", data.device, data.sku);
                            found.insert(data.ip, data);
                        }
                    }
                    Err(err) => debug!("ignoring datagram from {addr}: {err}"),
                },
                Ok(Err(e)) => return Err(Error::socket("scan receive", e)),
                // Slice elapsed; loop to re-check the window deadline.
                Err(_) => continue,
            }
        }

        Ok(found.into_values().collect())
    }

    /// Request and decode the full status of one lamp.
    ///
    /// Waits at most the reply timeout for a datagram from the queried
    /// device; datagrams from other senders inside the window are
    /// skipped, since replies are correlated by source address only.
    pub async fn fetch_status(&mut self, ip: Ipv4Addr) -> Result<StatusData> {
        let request = envelope::encode_status_request()?;
        let target = self.endpoints.control_endpoint(ip);
        debug!("querying status of {target}");
        self.socket
            .send_to(&request, target)
            .await
            .map_err(|e| Error::socket("status send", e))?;

        let deadline = Instant::now() + self.reply_timeout;
        let mut buf = [0u8; Self::RECV_BUFFER];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::ReplyTimeout { action: "devStatus" });
            }
            let (size, addr) = timeout(remaining, self.socket.recv_from(&mut buf))
                .await
                .map_err(|_| Error::ReplyTimeout { action: "devStatus" })?
                .map_err(|e| Error::socket("status receive", e))?;

            if addr.ip() != ip {
                debug!("ignoring datagram from {addr} while waiting on {ip}");
                continue;
            }
            return envelope::decode_status_response(&buf[..size]);
        }
    }

    /// Fire-and-forget command send to one lamp's control endpoint.
    ///
    /// The protocol does not acknowledge state changes, so a successful
    /// send is the success condition.
    pub(crate) async fn send_command(
        &mut self,
        ip: Ipv4Addr,
        request: &[u8],
        action: &str,
    ) -> Result<()> {
        let target = self.endpoints.control_endpoint(ip);
        debug!("sending {action} to {target}");
        self.socket
            .send_to(request, target)
            .await
            .map_err(|e| Error::socket(action, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn loopback_client(scan_target: &str, control_port: u16) -> LanClient {
        let endpoints =
            LanEndpoints::resolve(scan_target, "127.0.0.1:0", control_port).unwrap();
        LanClient::bind(endpoints)
            .await
            .unwrap()
            .with_reply_timeout(Duration::from_millis(250))
    }

    fn scan_reply(ip: &str, device: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({"msg": {"cmd": "scan", "data": {
            "ip": ip, "device": device, "sku": "H6159",
            "bleVersionHard": "1.00", "bleVersionSoft": "1.02",
            "wifiVersionHard": "1.00", "wifiVersionSoft": "1.03",
        }}}))
        .unwrap()
    }

    #[tokio::test]
    async fn discover_collects_every_responder_in_the_window() {
        let lamp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let lamp_addr = lamp.local_addr().unwrap();

        let mut client = loopback_client(&lamp_addr.to_string(), lamp_addr.port()).await;

        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (_, from) = lamp.recv_from(&mut buf).await.unwrap();
            // Several lamps answering the same multicast probe, one of
            // them twice.
            lamp.send_to(&scan_reply("192.168.1.50", "LampA"), from)
                .await
                .unwrap();
            lamp.send_to(&scan_reply("192.168.1.51", "LampB"), from)
                .await
                .unwrap();
            lamp.send_to(&scan_reply("192.168.1.50", "LampA-duplicate"), from)
                .await
                .unwrap();
            // Unrelated chatter on the listener port.
            lamp.send_to(b"M-SEARCH * HTTP/1.1", from).await.unwrap();
        });

        let found = client.discover(Duration::from_millis(600)).await.unwrap();
        let names: Vec<&str> = found.iter().map(|d| d.device.as_str()).collect();
        assert_eq!(names, ["LampA", "LampB"]);
    }

    #[tokio::test]
    async fn discover_returns_empty_when_nobody_answers() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();
        let mut client = loopback_client(&addr.to_string(), addr.port()).await;

        let found = client.discover(Duration::from_millis(200)).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn fetch_status_times_out_against_a_silent_device() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();
        let mut client = loopback_client("127.0.0.1:1", port).await;

        let err = client
            .fetch_status(Ipv4Addr::LOCALHOST)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReplyTimeout { action: "devStatus" }));
    }

    #[tokio::test]
    async fn fetch_status_rejects_a_wrong_tag_reply() {
        let lamp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = lamp.local_addr().unwrap().port();
        let mut client = loopback_client("127.0.0.1:1", port).await;

        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (_, from) = lamp.recv_from(&mut buf).await.unwrap();
            lamp.send_to(&scan_reply("127.0.0.1", "LampA"), from)
                .await
                .unwrap();
        });

        let err = client
            .fetch_status(Ipv4Addr::LOCALHOST)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedReply {
                expected: "devStatus",
                ..
            }
        ));
    }
}
