// AccelLog — System Events & Data Types

use crate::message::{AppMessageResult, Dictionary};

// ---------------------------------------------------------------------------
// Accelerometer sample (milli-g per axis)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    /// Set when the vibration motor was running while the sample was taken.
    pub did_vibrate: bool,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Sample {
    /// Size of one serialized logging record.
    pub const RECORD_SIZE: usize = 16;

    /// Serialize into the fixed-size logging record layout.
    pub fn to_record(&self) -> [u8; Self::RECORD_SIZE] {
        let mut out = [0u8; Self::RECORD_SIZE];
        out[0..2].copy_from_slice(&self.x.to_le_bytes());
        out[2..4].copy_from_slice(&self.y.to_le_bytes());
        out[4..6].copy_from_slice(&self.z.to_le_bytes());
        out[6] = u8::from(self.did_vibrate);
        // out[7] is padding
        out[8..16].copy_from_slice(&self.timestamp.to_le_bytes());
        out
    }

    pub fn from_record(raw: &[u8; Self::RECORD_SIZE]) -> Self {
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&raw[8..16]);
        Self {
            x: i16::from_le_bytes([raw[0], raw[1]]),
            y: i16::from_le_bytes([raw[2], raw[3]]),
            z: i16::from_le_bytes([raw[4], raw[5]]),
            did_vibrate: raw[6] != 0,
            timestamp: u64::from_le_bytes(ts),
        }
    }
}

// ---------------------------------------------------------------------------
// Battery
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChargeState {
    pub charge_percent: u8,
    pub is_charging: bool,
    pub is_plugged: bool,
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Select,
    Down,
}

// ---------------------------------------------------------------------------
// Phone link events — reported by the channel on poll
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Outgoing message was delivered.
    OutboxSent,
    /// Outgoing message failed.
    OutboxFailed(AppMessageResult),
    /// Incoming message received.  Boxed so queued events stay small.
    InboxReceived(Box<Dictionary>),
    /// Incoming message dropped.
    InboxDropped(AppMessageResult),
}

// ---------------------------------------------------------------------------
// App events — dispatched one at a time by the event loop
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Click(Button),
    Link(LinkEvent),
}
