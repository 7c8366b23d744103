use std::net::Ipv4Addr;

/// All error types that can occur when interacting with Govee lights.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One of the configured network endpoints could not be parsed.
    #[error("failed to resolve endpoint {addr:?}: {reason}")]
    AddressResolution { addr: String, reason: String },

    /// Failed to serialize an envelope to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize a JSON envelope.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed while communicating with a lamp.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// A reply decoded cleanly but carried the wrong command tag.
    #[error("unexpected {got:?} reply while waiting for {expected:?}")]
    UnexpectedReply {
        expected: &'static str,
        got: String,
    },

    /// No reply arrived within the configured wait.
    #[error("timed out waiting for {action} reply")]
    ReplyTimeout { action: &'static str },

    /// A lamp reported a power value outside the on/off domain.
    #[error("invalid power value {0} (expected 0 or 1)")]
    InvalidPowerValue(u8),

    /// The registry has no entry for the given IP.
    #[error("no known device at {0}")]
    DeviceNotFound(Ipv4Addr),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new address resolution error
    pub fn address_resolution(addr: &str, reason: impl ToString) -> Self {
        Error::AddressResolution {
            addr: addr.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
