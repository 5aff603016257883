//! midikeys - Typing keyboard as a MIDI controller
//!
//! Reads raw key events from a Linux keyboard device (`/dev/input/eventN`),
//! looks the key codes up in a user supplied mapping and sends a MIDI note-on
//! for every press and a velocity 0 note-on for every release.
//!
//! - Plain text key map: one `<key-code>=<note>` per line
//! - ALSA sequencer or JACK MIDI output
//! - Typing keyboard auto-detection from `/proc/bus/input/devices`
//! - Configurable via TOML file
//!
//! # Usage as a Library
//!
//! ```no_run
//! use midikeys::{parser, run, DummyMidiOutput, Translator};
//! use std::sync::atomic::AtomicBool;
//!
//! let report = parser::parse_str("30=60\n31=62\n");
//! let translator = Translator::new(report.keymap);
//!
//! let keyboard = std::fs::File::open("/dev/input/event3")?;
//! let mut sink = DummyMidiOutput;
//! run(keyboard, &translator, &mut sink, &AtomicBool::new(false))?;
//! # Ok::<(), midikeys::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod input;
pub mod keymap;
pub mod midi;
pub mod parser;
pub mod signals;
pub mod translator;

// Re-export main types
pub use client::MidiKeysClient;
pub use config::{Config, KeyboardSettings, MidiSettings};
pub use device::{resolve_keyboard_device, InputDevice};
pub use error::{Error, Result};
pub use input::{RawInputEvent, EV_KEY, RECORD_SIZE};
pub use keymap::{KeyMap, KeyMapBuilder};
pub use midi::{open_output, AlsaMidiOutput, DummyMidiOutput, JackMidiOutput, MidiBackend, MidiSink, NoteEvent};
pub use parser::{load_key_map, LineError, LineWarning, ParseReport};
pub use translator::{run, RunStats, Translator, DEFAULT_CHANNEL, DEFAULT_VELOCITY};
