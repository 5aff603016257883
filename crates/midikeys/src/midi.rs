//! MIDI output backends
//!
//! Notes go out through the [`MidiSink`] trait. The ALSA sequencer backend
//! (via midir) is the default on Linux; JACK MIDI is available for setups
//! that route everything through a JACK graph.

use crate::config::MidiSettings;
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// MIDI backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MidiBackend {
    /// ALSA sequencer
    #[default]
    Alsa,
    /// JACK MIDI output
    Jack,
    /// No MIDI output, notes are only logged
    None,
}

/// A note message. Velocity 0 releases the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
}

impl NoteEvent {
    /// Convert to raw MIDI bytes (always a note-on status byte)
    pub fn to_bytes(&self) -> [u8; 3] {
        [0x90 | (self.channel & 0x0F), self.note & 0x7F, self.velocity & 0x7F]
    }
}

/// Destination for note events
pub trait MidiSink {
    /// Send a note-on; velocity 0 means note-off.
    ///
    /// Delivery failures are handled by the backend, never by the caller.
    fn send_event(&mut self, channel: u8, note: u8, velocity: u8);

    /// Get the port name
    fn port_name(&self) -> &str;
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send_event(&mut self, channel: u8, note: u8, velocity: u8) {
        (**self).send_event(channel, note, velocity)
    }

    fn port_name(&self) -> &str {
        (**self).port_name()
    }
}

/// ALSA sequencer output through midir
pub struct AlsaMidiOutput {
    connection: midir::MidiOutputConnection,
    port_name: String,
}

impl AlsaMidiOutput {
    /// Connect to the first sequencer port whose name contains `destination`
    pub fn connect(client_name: &str, destination: &str) -> Result<Self> {
        let output = midir::MidiOutput::new(client_name).map_err(|e| Error::Midi(e.to_string()))?;

        let port = output
            .ports()
            .into_iter()
            .find(|p| output.port_name(p).is_ok_and(|name| name.contains(destination)))
            .ok_or_else(|| Error::Midi(format!("MIDI destination not found: {}", destination)))?;
        let port_name = output.port_name(&port).map_err(|e| Error::Midi(e.to_string()))?;

        let connection = output
            .connect(&port, client_name)
            .map_err(|e| Error::Midi(e.to_string()))?;

        Ok(Self {
            connection,
            port_name,
        })
    }

    /// Create a virtual sequencer port other clients can subscribe to
    #[cfg(unix)]
    pub fn virtual_port(client_name: &str, port_name: &str) -> Result<Self> {
        use midir::os::unix::VirtualOutput;

        let output = midir::MidiOutput::new(client_name).map_err(|e| Error::Midi(e.to_string()))?;
        let connection = output
            .create_virtual(port_name)
            .map_err(|e| Error::Midi(e.to_string()))?;

        Ok(Self {
            connection,
            port_name: format!("{}:{}", client_name, port_name),
        })
    }

    /// Create from settings
    pub fn from_settings(settings: &MidiSettings) -> Result<Self> {
        match settings.destination.as_deref() {
            Some(destination) => Self::connect(&settings.client_name, destination),
            #[cfg(unix)]
            None => Self::virtual_port(&settings.client_name, &settings.port_name),
            #[cfg(not(unix))]
            None => Err(Error::Midi("a MIDI destination is required on this platform".to_string())),
        }
    }
}

impl MidiSink for AlsaMidiOutput {
    fn send_event(&mut self, channel: u8, note: u8, velocity: u8) {
        let event = NoteEvent { channel, note, velocity };
        if let Err(e) = self.connection.send(&event.to_bytes()) {
            log::warn!("Failed to send MIDI event to {}: {}", self.port_name, e);
        }
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Events waiting for the JACK process callback; further events are dropped
pub const JACK_QUEUE_CAPACITY: usize = 1024;

/// JACK MIDI output
pub struct JackMidiOutput {
    /// Sender for MIDI messages to the JACK process callback
    tx: Sender<NoteEvent>,
    /// Port name
    port_name: String,
    /// Keep the client alive
    client: jack::AsyncClient<(), JackMidiHandler>,
}

impl JackMidiOutput {
    /// Create a new JACK MIDI output
    pub fn new(client_name: &str, port_name: &str) -> Result<Self> {
        let (client, _status) = jack::Client::new(client_name, jack::ClientOptions::NO_START_SERVER)?;
        let midi_out = client.register_port(port_name, jack::MidiOut::default())?;
        // JACK may have renamed the client if the requested name was taken
        let full_port_name = midi_out.name()?;

        let (tx, rx) = bounded(JACK_QUEUE_CAPACITY);
        let handler = JackMidiHandler { midi_out, rx };
        let active_client = client.activate_async((), handler)?;

        Ok(Self {
            tx,
            port_name: full_port_name,
            client: active_client,
        })
    }

    /// Create from settings
    pub fn from_settings(settings: &MidiSettings) -> Result<Self> {
        let output = Self::new(&settings.client_name, &settings.port_name)?;

        let destinations = settings.destination.iter().chain(settings.auto_connect.iter().flatten());
        for dest in destinations {
            if let Err(e) = output.connect_to(dest) {
                log::warn!("Failed to auto-connect to {}: {}", dest, e);
            }
        }

        Ok(output)
    }

    /// Connect to a JACK MIDI input port
    pub fn connect_to(&self, destination: &str) -> Result<()> {
        self.client
            .as_client()
            .connect_ports_by_name(&self.port_name, destination)?;
        log::info!("Connected {} -> {}", self.port_name, destination);
        Ok(())
    }
}

impl MidiSink for JackMidiOutput {
    fn send_event(&mut self, channel: u8, note: u8, velocity: u8) {
        queue_event(&self.tx, NoteEvent { channel, note, velocity });
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Hand an event to the process callback without blocking the caller
fn queue_event(tx: &Sender<NoteEvent>, event: NoteEvent) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            log::warn!("JACK MIDI queue full, dropping note {}", event.note);
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            log::warn!("JACK process handler is gone, dropping MIDI event");
            false
        }
    }
}

/// JACK process handler for MIDI output
struct JackMidiHandler {
    midi_out: jack::Port<jack::MidiOut>,
    rx: Receiver<NoteEvent>,
}

impl jack::ProcessHandler for JackMidiHandler {
    fn process(&mut self, _client: &jack::Client, ps: &jack::ProcessScope) -> jack::Control {
        let mut writer = self.midi_out.writer(ps);

        while let Ok(event) = self.rx.try_recv() {
            let bytes = event.to_bytes();
            let raw = jack::RawMidi {
                time: 0,
                bytes: &bytes,
            };
            let _ = writer.write(&raw);
        }

        jack::Control::Continue
    }
}

/// Dummy MIDI output, only logs
pub struct DummyMidiOutput;

impl MidiSink for DummyMidiOutput {
    fn send_event(&mut self, channel: u8, note: u8, velocity: u8) {
        log::debug!("MIDI Note On: ch={} note={} vel={}", channel, note, velocity);
    }

    fn port_name(&self) -> &str {
        "dummy"
    }
}

/// Open the backend selected in the settings
pub fn open_output(settings: &MidiSettings) -> Result<Box<dyn MidiSink>> {
    let output: Box<dyn MidiSink> = match settings.backend {
        MidiBackend::Alsa => Box::new(AlsaMidiOutput::from_settings(settings)?),
        MidiBackend::Jack => Box::new(JackMidiOutput::from_settings(settings)?),
        MidiBackend::None => Box::new(DummyMidiOutput),
    };
    log::info!("MIDI output ready: {}", output.port_name());
    Ok(output)
}

/// Check if JACK is running
pub fn is_jack_running() -> bool {
    jack::Client::new("midikeys-check", jack::ClientOptions::NO_START_SERVER).is_ok()
}

/// List available JACK MIDI input ports
pub fn list_jack_midi_ports() -> Vec<String> {
    if let Ok((client, _)) = jack::Client::new("midikeys-list", jack::ClientOptions::NO_START_SERVER) {
        client.ports(None, Some("midi"), jack::PortFlags::IS_INPUT)
    } else {
        Vec::new()
    }
}

/// List ALSA sequencer ports that accept MIDI
pub fn list_alsa_midi_ports() -> Vec<String> {
    match midir::MidiOutput::new("midikeys-list") {
        Ok(output) => {
            let ports = output.ports();
            ports.iter().filter_map(|p| output.port_name(p).ok()).collect()
        }
        Err(e) => {
            log::warn!("ALSA sequencer unavailable: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_event_bytes() {
        let press = NoteEvent { channel: 0, note: 60, velocity: 100 };
        assert_eq!(press.to_bytes(), [0x90, 60, 100]);

        let release = NoteEvent { channel: 1, note: 48, velocity: 0 };
        assert_eq!(release.to_bytes(), [0x91, 48, 0]);
    }

    #[test]
    fn test_note_event_bytes_masked() {
        let event = NoteEvent { channel: 0x13, note: 0xFF, velocity: 0x80 };
        assert_eq!(event.to_bytes(), [0x93, 0x7F, 0x00]);
    }

    #[test]
    fn test_jack_queue_is_capped() {
        let (tx, rx) = bounded(2);
        let event = NoteEvent { channel: 0, note: 60, velocity: 100 };
        assert!(queue_event(&tx, event));
        assert!(queue_event(&tx, event));
        // nobody drains the queue, e.g. the JACK server went away
        assert!(!queue_event(&tx, event));
        assert_eq!(rx.len(), 2);

        drop(rx);
        assert!(!queue_event(&tx, event));
    }

    #[test]
    fn test_jack_port_name_uses_actual_client_name() {
        if !is_jack_running() {
            return;
        }
        let first = JackMidiOutput::new("midikeys-test", "midi_out").unwrap();
        let second = JackMidiOutput::new("midikeys-test", "midi_out").unwrap();

        let client = second.client.as_client().name().to_string();
        assert_eq!(second.port_name(), format!("{}:midi_out", client));
        assert_ne!(first.port_name(), second.port_name());
    }

    #[test]
    fn test_dummy_output() {
        let mut output: Box<dyn MidiSink> = Box::new(DummyMidiOutput);
        output.send_event(0, 60, 100);
        output.send_event(0, 60, 0);
        assert_eq!(output.port_name(), "dummy");
    }

    #[test]
    fn test_backend_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            backend: MidiBackend,
        }
        let w: Wrapper = toml::from_str("backend = \"jack\"").unwrap();
        assert_eq!(w.backend, MidiBackend::Jack);
        assert_eq!(MidiBackend::default(), MidiBackend::Alsa);
    }
}
