//! Settings file support for midikeys
//!
//! Settings are stored in TOML format at:
//! - Linux: `~/.config/midikeys/config.toml`
//!
//! The key mapping itself lives in a separate plain text file, see
//! [`crate::parser`]. Every setting can also be given on the command line.

use crate::error::{Error, Result};
use crate::midi::MidiBackend;
use crate::translator::{DEFAULT_CHANNEL, DEFAULT_VELOCITY};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keyboard configuration
    pub keyboard: KeyboardSettings,
    /// MIDI configuration
    pub midi: MidiSettings,
}

impl Config {
    /// Load configuration from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, or the defaults if there is no config file.
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn load_or_default() -> Result<Self> {
        Self::load_from_or_default(Self::config_path()?)
    }

    /// Load configuration from `path`, or the defaults if it does not exist
    pub fn load_from_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from(path)
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "midikeys") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, DEFAULT_CONFIG_FILE)?;
        Ok(path)
    }
}

const DEFAULT_CONFIG_FILE: &str = r#"# midikeys configuration file

[keyboard]
# Key mapping file, one "<key-code>=<note>" per line
# map_file = "/home/me/.config/midikeys/keys.map"

# Keyboard device node (default: detected from /proc/bus/input/devices)
# device = "/dev/input/event3"

# MIDI channel (0-15)
channel = 0

# Velocity for key presses (1-127)
velocity = 100

[midi]
# Backend: "alsa", "jack" or "none"
backend = "alsa"

# Sequencer / JACK client name
client_name = "midikeys"

# Output port name
port_name = "midi_out"

# Destination to connect to (ALSA: part of the port name, JACK: full port name).
# Without a destination a port is created that other clients can connect to.
# destination = "FLUID Synth"

# Additional JACK MIDI inputs to connect to (jack only)
# auto_connect = ["a2j:Hydrogen"]
"#;

/// Keyboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardSettings {
    /// Key mapping file
    pub map_file: Option<PathBuf>,
    /// Keyboard device node, skips detection when set
    pub device: Option<PathBuf>,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Velocity for key presses (1-127)
    pub velocity: u8,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            map_file: None,
            device: None,
            channel: DEFAULT_CHANNEL,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

/// MIDI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiSettings {
    /// Output backend
    pub backend: MidiBackend,
    /// Sequencer / JACK client name
    pub client_name: String,
    /// MIDI output port name
    pub port_name: String,
    /// Destination port to send to
    pub destination: Option<String>,
    /// Auto-connect to these JACK MIDI inputs
    pub auto_connect: Option<Vec<String>>,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            backend: MidiBackend::Alsa,
            client_name: "midikeys".to_string(),
            port_name: "midi_out".to_string(),
            destination: None,
            auto_connect: None,
        }
    }
}
