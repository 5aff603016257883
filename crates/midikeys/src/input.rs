//! Raw Linux input event records
//!
//! Mirrors `struct input_event` from `<linux/input.h>`:
//!
//! ```text
//! struct input_event {
//!     struct timeval time;   // two C longs
//!     __u16 type;
//!     __u16 code;
//!     __s32 value;
//! };
//! ```
//!
//! Records are read from the device in whole units only, in native byte order.

use std::ffi::c_long;
use std::mem::size_of;

/// Event kind for key and button state changes
pub const EV_KEY: u16 = 0x01;

/// `value` of an `EV_KEY` event for a released key
pub const KEY_RELEASE: i32 = 0;

/// `value` of an `EV_KEY` event for a pressed key
pub const KEY_PRESS: i32 = 1;

/// `value` of an `EV_KEY` event sent while a key is held down
pub const KEY_REPEAT: i32 = 2;

const TIMEVAL_SIZE: usize = 2 * size_of::<c_long>();

/// Size in bytes of one `struct input_event`
pub const RECORD_SIZE: usize = TIMEVAL_SIZE + 8;

/// One decoded input event (the timestamp is not kept)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputEvent {
    /// Event kind (`EV_KEY`, `EV_SYN`, `EV_MSC`, ...)
    pub kind: u16,
    /// Key code for `EV_KEY` events
    pub code: u16,
    /// 0 release, 1 press, 2 auto-repeat for `EV_KEY` events
    pub value: i32,
}

impl RawInputEvent {
    pub fn new(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// Decode a full record. Returns `None` unless exactly `RECORD_SIZE` bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != RECORD_SIZE {
            return None;
        }
        let fields = &bytes[TIMEVAL_SIZE..];
        Some(Self {
            kind: u16::from_ne_bytes([fields[0], fields[1]]),
            code: u16::from_ne_bytes([fields[2], fields[3]]),
            value: i32::from_ne_bytes([fields[4], fields[5], fields[6], fields[7]]),
        })
    }

    /// Encode as a record with a zero timestamp
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut record = [0u8; RECORD_SIZE];
        record[TIMEVAL_SIZE..TIMEVAL_SIZE + 2].copy_from_slice(&self.kind.to_ne_bytes());
        record[TIMEVAL_SIZE + 2..TIMEVAL_SIZE + 4].copy_from_slice(&self.code.to_ne_bytes());
        record[TIMEVAL_SIZE + 4..].copy_from_slice(&self.value.to_ne_bytes());
        record
    }

    /// Whether this is a key state change
    pub fn is_key(&self) -> bool {
        self.kind == EV_KEY
    }
}
