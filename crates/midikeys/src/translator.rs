//! Key event to MIDI note translation
//!
//! [`Translator`] turns one raw input event into at most one note event, and
//! [`run`] drives it from a blocking byte source until the source ends, the
//! shutdown flag is raised, or reading fails.

use crate::error::{Error, Result};
use crate::input::{RawInputEvent, KEY_PRESS, KEY_RELEASE, RECORD_SIZE};
use crate::keymap::KeyMap;
use crate::midi::{MidiSink, NoteEvent};
use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};

/// MIDI channel notes are sent on
pub const DEFAULT_CHANNEL: u8 = 0;

/// Velocity for key presses
pub const DEFAULT_VELOCITY: u8 = 100;

/// Maps key state changes to note events
#[derive(Debug, Clone)]
pub struct Translator {
    keymap: KeyMap,
    channel: u8,
    velocity: u8,
}

impl Translator {
    /// Create a translator sending on channel 0 with velocity 100
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            channel: DEFAULT_CHANNEL,
            velocity: DEFAULT_VELOCITY,
        }
    }

    /// Set the MIDI channel (clamped to 0-15)
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel.min(15);
        self
    }

    /// Set the press velocity (clamped to 1-127)
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity.clamp(1, 127);
        self
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Translate one input event.
    ///
    /// Only `EV_KEY` presses and releases of mapped keys produce a note;
    /// auto-repeat and every other event are dropped.
    pub fn translate(&self, event: &RawInputEvent) -> Option<NoteEvent> {
        if !event.is_key() {
            return None;
        }
        let velocity = match event.value {
            KEY_RELEASE => 0,
            KEY_PRESS => self.velocity,
            _ => return None,
        };
        let note = self.keymap.get(i32::from(event.code))?;

        Some(NoteEvent {
            channel: self.channel,
            // the data byte only carries 7 bits
            note: (note & 0x7F) as u8,
            velocity,
        })
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Complete records read
    pub records: u64,
    /// Note events sent
    pub dispatched: u64,
}

/// Read input events from `source` and send the translated notes to `sink`.
///
/// Each iteration blocks on a single read of one record. Interrupted reads are
/// retried and short reads are skipped. Returns when the source reports end of
/// stream or `shutdown` is set; any other read error ends the loop with
/// [`Error::DeviceRead`].
pub fn run<R, S>(mut source: R, translator: &Translator, sink: &mut S, shutdown: &AtomicBool) -> Result<RunStats>
where
    R: Read,
    S: MidiSink + ?Sized,
{
    let mut buf = [0u8; RECORD_SIZE];
    let mut stats = RunStats::default();

    loop {
        if shutdown.load(Ordering::Relaxed) {
            log::info!("Shutting down");
            return Ok(stats);
        }

        let n = match source.read(&mut buf) {
            Ok(0) => {
                log::info!("Keyboard input closed");
                return Ok(stats);
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::DeviceRead(e)),
        };

        let Some(event) = RawInputEvent::from_bytes(&buf[..n]) else {
            log::trace!("Discarding partial input record ({} of {} bytes)", n, RECORD_SIZE);
            continue;
        };
        stats.records += 1;

        if !event.is_key() {
            continue;
        }
        log::debug!("Typing keyboard: {} {}", event.value, event.code);

        if let Some(note) = translator.translate(&event) {
            log::debug!("Send ch:note:vel: {}:{}:{}", note.channel, note.note, note.velocity);
            sink.send_event(note.channel, note.note, note.velocity);
            stats.dispatched += 1;
        }
    }
}
