//! midikeys - Typing keyboard as a MIDI controller
//!
//! Reads key presses from a Linux keyboard device and sends them as MIDI notes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use midikeys::{
    config::Config,
    device::{list_keyboards, PROC_INPUT_DEVICES},
    midi::{is_jack_running, list_alsa_midi_ports, list_jack_midi_ports, open_output, MidiBackend},
    signals::exit_on_termination,
    MidiKeysClient,
};

#[derive(Parser)]
#[command(name = "midikeys")]
#[command(author, version, about = "Play MIDI notes from a typing keyboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Key mapping file, one "<key-code>=<note>" per line
    #[arg(value_name = "MAP_FILE")]
    map_file: Option<PathBuf>,

    /// Config file path (default: ~/.config/midikeys/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keyboard device node (default: detect the typing keyboard)
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// Sequencer / JACK client name
    #[arg(long)]
    client_name: Option<String>,

    /// MIDI destination to connect to
    #[arg(long)]
    destination: Option<String>,

    /// MIDI backend
    #[arg(long, value_enum)]
    backend: Option<MidiBackend>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
    /// List available MIDI destinations
    ListPorts,
    /// List keyboard input devices
    Devices,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        Some(Commands::ListPorts) => {
            list_ports();
            return Ok(());
        }
        Some(Commands::Devices) => {
            let content = std::fs::read_to_string(PROC_INPUT_DEVICES)
                .with_context(|| format!("reading {}", PROC_INPUT_DEVICES))?;
            for device in list_keyboards(&content) {
                let marker = if device.is_typing_keyboard() { "*" } else { " " };
                let id = device.event_id().unwrap_or("?");
                println!("{} /dev/input/event{:<4} {}", marker, id, device.name);
            }
            return Ok(());
        }
        None => {}
    }

    // Load config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_or_default().context("loading config")?,
    };

    // Apply CLI overrides
    if let Some(map_file) = cli.map_file {
        config.keyboard.map_file = Some(map_file);
    }
    if let Some(device) = cli.device {
        config.keyboard.device = Some(device);
    }
    if let Some(client_name) = cli.client_name {
        config.midi.client_name = client_name;
    }
    if let Some(destination) = cli.destination {
        config.midi.destination = Some(destination);
    }
    if let Some(backend) = cli.backend {
        config.midi.backend = backend;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let _signals = exit_on_termination(Arc::clone(&shutdown)).context("installing signal handlers")?;

    let client = MidiKeysClient::new(&config.keyboard).context("starting keyboard client")?;
    let mut output = open_output(&config.midi).context("opening MIDI output")?;

    client.run(&mut output, &shutdown)?;
    Ok(())
}

fn list_ports() {
    let alsa = list_alsa_midi_ports();
    if alsa.is_empty() {
        println!("No ALSA MIDI destinations found");
    } else {
        println!("Available ALSA MIDI destinations:");
        for port in alsa {
            println!("  {}", port);
        }
    }

    if !is_jack_running() {
        println!("JACK is not running");
        return;
    }
    let ports = list_jack_midi_ports();
    if ports.is_empty() {
        println!("No JACK MIDI input ports found");
    } else {
        println!("Available JACK MIDI input ports:");
        for port in ports {
            println!("  {}", port);
        }
    }
}
