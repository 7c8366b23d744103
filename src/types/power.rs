//! Power state of a lamp.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// On/off state of a lamp.
///
/// The wire protocol restricts power to the {0, 1} domain; this type makes
/// any other value unrepresentable, so a toggle is a plain complement.
///
/// # Examples
///
/// ```
/// use govee_lights_rs::PowerState;
///
/// assert_eq!(!PowerState::Off, PowerState::On);
/// assert_eq!(!!PowerState::On, PowerState::On);
/// assert_eq!(PowerState::On.value(), 1);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PowerState {
    Off,
    On,
}

impl PowerState {
    /// The wire value (`0` off, `1` on).
    pub fn value(self) -> u8 {
        match self {
            PowerState::Off => 0,
            PowerState::On => 1,
        }
    }

    /// Parse a wire value, rejecting anything outside {0, 1}.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(PowerState::Off),
            1 => Some(PowerState::On),
            _ => None,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, PowerState::On)
    }
}

impl std::ops::Not for PowerState {
    type Output = PowerState;

    fn not(self) -> PowerState {
        match self {
            PowerState::Off => PowerState::On,
            PowerState::On => PowerState::Off,
        }
    }
}
