//! Error types for midikeys

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for midikeys operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in midikeys
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key mapping file missing or unreadable
    #[error("Keyboard mapping file not readable: {}: {source}", path.display())]
    MapFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No typing keyboard found among the input devices
    #[error("Typing keyboard not found: {0}")]
    DeviceNotFound(String),

    /// Keyboard device node could not be opened
    #[error("Cannot open typing keyboard file: {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from the keyboard device failed
    #[error("Error reading typing keyboard: {0}")]
    DeviceRead(#[source] std::io::Error),

    /// MIDI backend error
    #[error("MIDI error: {0}")]
    Midi(String),

    /// JACK connection error
    #[error("JACK error: {0}")]
    Jack(#[from] jack::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
