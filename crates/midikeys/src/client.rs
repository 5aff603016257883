//! Typing keyboard MIDI client
//!
//! Ties the pieces together: opens the keyboard device, loads the key map and
//! runs the translation loop against a MIDI sink.

use crate::config::KeyboardSettings;
use crate::device::{device_path, open_keyboard, resolve_keyboard_device};
use crate::error::{Error, Result};
use crate::midi::MidiSink;
use crate::parser::load_key_map;
use crate::translator::{run, RunStats, Translator};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

/// A keyboard device opened for reading together with its key map
pub struct MidiKeysClient {
    keyboard: File,
    device: PathBuf,
    translator: Translator,
}

impl MidiKeysClient {
    /// Open the keyboard and load the key map.
    ///
    /// Fails if no map file is configured, the map file cannot be read, or the
    /// keyboard cannot be found or opened.
    pub fn new(settings: &KeyboardSettings) -> Result<Self> {
        let map_file = settings
            .map_file
            .as_deref()
            .ok_or_else(|| Error::Config("no keyboard mapping file given".to_string()))?;

        let device = match &settings.device {
            Some(path) => path.clone(),
            None => {
                let id = resolve_keyboard_device()?;
                log::debug!("Found typing keyboard, input Id: {}", id);
                device_path(&id)
            }
        };

        Self::open(&device, map_file, settings.channel, settings.velocity)
    }

    /// Open an explicit device node with an explicit map file
    pub fn open(device: &Path, map_file: &Path, channel: u8, velocity: u8) -> Result<Self> {
        let keyboard = open_keyboard(device)?;
        log::debug!("Opened typing keyboard: {}", device.display());

        let report = load_key_map(map_file)?;
        log::info!(
            "Loaded {} key mappings from {} ({} lines skipped)",
            report.keymap.len(),
            map_file.display(),
            report.warnings.len()
        );

        let translator = Translator::new(report.keymap)
            .with_channel(channel)
            .with_velocity(velocity);

        Ok(Self {
            keyboard,
            device: device.to_path_buf(),
            translator,
        })
    }

    /// Device node being read
    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Translate key events until shutdown or a device error
    pub fn run<S: MidiSink + ?Sized>(self, sink: &mut S, shutdown: &AtomicBool) -> Result<RunStats> {
        log::info!(
            "Reading {} -> {} (Press Ctrl+C to exit)",
            self.device().display(),
            sink.port_name()
        );
        log::debug!(
            "{} mapped keys, channel {}, velocity {}",
            self.translator().keymap().len(),
            self.translator().channel(),
            self.translator().velocity()
        );
        let stats = run(self.keyboard, &self.translator, sink, shutdown)?;
        log::info!("{} key events read, {} notes sent", stats.records, stats.dispatched);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{RawInputEvent, EV_KEY, KEY_PRESS, KEY_RELEASE};
    use std::fs;

    struct Collect(Vec<(u8, u8, u8)>);

    impl MidiSink for Collect {
        fn send_event(&mut self, channel: u8, note: u8, velocity: u8) {
            self.0.push((channel, note, velocity));
        }

        fn port_name(&self) -> &str {
            "collect"
        }
    }

    #[test]
    fn test_requires_map_file() {
        let settings = KeyboardSettings::default();
        assert!(matches!(MidiKeysClient::new(&settings), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_device_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("keys.map");
        fs::write(&map, "30=60\n").unwrap();

        let settings = KeyboardSettings {
            map_file: Some(map),
            device: Some(dir.path().join("event42")),
            ..Default::default()
        };
        assert!(matches!(MidiKeysClient::new(&settings), Err(Error::DeviceOpen { .. })));
    }

    #[test]
    fn test_missing_map_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let device = dir.path().join("event0");
        fs::write(&device, b"").unwrap();

        let result = MidiKeysClient::open(&device, &dir.path().join("nope.map"), 0, 100);
        assert!(matches!(result, Err(Error::MapFile { .. })));
    }

    #[test]
    fn test_run_from_recorded_events() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("keys.map");
        fs::write(&map, "30=60\n31=62\nbad-line\n30=64\n").unwrap();

        // A file of recorded input_event records stands in for the device
        let device = dir.path().join("event0");
        let mut records = Vec::new();
        records.extend_from_slice(&RawInputEvent::new(EV_KEY, 30, KEY_PRESS).to_bytes());
        records.extend_from_slice(&RawInputEvent::new(EV_KEY, 31, KEY_PRESS).to_bytes());
        records.extend_from_slice(&RawInputEvent::new(EV_KEY, 30, KEY_RELEASE).to_bytes());
        fs::write(&device, records).unwrap();

        let settings = KeyboardSettings {
            map_file: Some(map),
            device: Some(device.clone()),
            ..Default::default()
        };
        let client = MidiKeysClient::new(&settings).unwrap();
        assert_eq!(client.device(), device.as_path());
        assert_eq!(client.translator().keymap().len(), 2);

        let mut sink = Collect(Vec::new());
        let stats = client.run(&mut sink, &AtomicBool::new(false)).unwrap();
        assert_eq!(sink.0, vec![(0, 64, 100), (0, 62, 100), (0, 64, 0)]);
        assert_eq!(stats.dispatched, 3);
    }
}
