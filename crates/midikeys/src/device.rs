//! Typing keyboard discovery
//!
//! The kernel lists input devices in `/proc/bus/input/devices`, one block per
//! device separated by blank lines. A typing keyboard is a device that reports
//! the event set `EV=120013` (SYN, KEY, MSC, LED, REP) and is bound to both the
//! `kbd` handler and an `eventN` node.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Kernel listing of input devices
pub const PROC_INPUT_DEVICES: &str = "/proc/bus/input/devices";

/// Directory holding the `eventN` nodes
pub const INPUT_DIR: &str = "/dev/input";

/// Event type bitmask reported by full typing keyboards
pub const TYPING_KEYBOARD_EV: &str = "120013";

/// An input device as listed by the kernel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputDevice {
    /// Human readable device name
    pub name: String,
    /// Handlers bound to the device (`kbd`, `event3`, `leds`, ...)
    pub handlers: Vec<String>,
    /// Supported event types bitmask, as hex text
    pub ev: String,
}

impl InputDevice {
    /// Id of the `eventN` handler, e.g. `"3"` for `event3`
    pub fn event_id(&self) -> Option<&str> {
        self.handlers.iter().find_map(|h| {
            h.strip_prefix("event")
                .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
        })
    }

    /// Bound to the console keyboard handler
    pub fn is_keyboard(&self) -> bool {
        self.handlers.iter().any(|h| h == "kbd") && self.event_id().is_some()
    }

    /// A full typing keyboard rather than e.g. a power button or media remote
    pub fn is_typing_keyboard(&self) -> bool {
        self.is_keyboard() && self.ev.eq_ignore_ascii_case(TYPING_KEYBOARD_EV)
    }
}

/// Parse the contents of `/proc/bus/input/devices`
pub fn parse_input_devices(content: &str) -> Vec<InputDevice> {
    let mut devices = Vec::new();
    let mut current: Option<InputDevice> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            devices.extend(current.take());
            continue;
        }

        let device = current.get_or_insert_with(InputDevice::default);
        if let Some(name) = line.strip_prefix("N: Name=") {
            device.name = name.trim_matches('"').to_string();
        } else if let Some(handlers) = line.strip_prefix("H: Handlers=") {
            device.handlers = handlers.split_whitespace().map(str::to_string).collect();
        } else if let Some(ev) = line.strip_prefix("B: EV=") {
            device.ev = ev.trim().to_string();
        }
    }
    devices.extend(current);

    devices
}

/// Find the event id of the first typing keyboard in a device listing
pub fn find_keyboard_event(content: &str) -> Option<String> {
    parse_input_devices(content)
        .into_iter()
        .find(InputDevice::is_typing_keyboard)
        .and_then(|d| d.event_id().map(str::to_string))
}

/// Keyboard-like devices in a device listing
pub fn list_keyboards(content: &str) -> Vec<InputDevice> {
    parse_input_devices(content)
        .into_iter()
        .filter(InputDevice::is_keyboard)
        .collect()
}

/// Resolve the typing keyboard to its event id using the kernel device list
pub fn resolve_keyboard_device() -> Result<String> {
    let content = fs::read_to_string(PROC_INPUT_DEVICES)?;
    find_keyboard_event(&content).ok_or_else(|| {
        Error::DeviceNotFound(format!("no device with EV={} in {}", TYPING_KEYBOARD_EV, PROC_INPUT_DEVICES))
    })
}

/// Path of the device node for an event id
pub fn device_path(event_id: &str) -> PathBuf {
    Path::new(INPUT_DIR).join(format!("event{}", event_id))
}

/// Open a keyboard device node for reading
pub fn open_keyboard(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    File::open(path).map_err(|source| Error::DeviceOpen {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICES: &str = r#"I: Bus=0019 Vendor=0000 Product=0001 Version=0000
N: Name="Power Button"
P: Phys=LNXPWRBN/button/input0
S: Sysfs=/devices/LNXSYSTM:00/LNXPWRBN:00/input/input0
U: Uniq=
H: Handlers=kbd event0
B: PROP=0
B: EV=3
B: KEY=10000000000000 0

I: Bus=0003 Vendor=046d Product=c52b Version=0111
N: Name="Logitech USB Receiver Mouse"
H: Handlers=mouse0 event2
B: PROP=0
B: EV=17

I: Bus=0011 Vendor=0001 Product=0001 Version=ab41
N: Name="AT Translated Set 2 keyboard"
P: Phys=isa0060/serio0/input0
S: Sysfs=/devices/platform/i8042/serio0/input/input3
U: Uniq=
H: Handlers=sysrq kbd leds event3
B: PROP=0
B: EV=120013
B: KEY=402000000 3803078f800d001 feffffdfffefffff fffffffffffffffe
B: MSC=10
B: LED=7
"#;

    #[test]
    fn test_parse_input_devices() {
        let devices = parse_input_devices(DEVICES);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].name, "Power Button");
        assert_eq!(devices[2].name, "AT Translated Set 2 keyboard");
        assert_eq!(devices[2].handlers, vec!["sysrq", "kbd", "leds", "event3"]);
        assert_eq!(devices[2].ev, "120013");
    }

    #[test]
    fn test_find_typing_keyboard_skips_power_button() {
        assert_eq!(find_keyboard_event(DEVICES), Some("3".to_string()));
    }

    #[test]
    fn test_list_keyboards() {
        let names: Vec<_> = list_keyboards(DEVICES).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Power Button", "AT Translated Set 2 keyboard"]);
    }

    #[test]
    fn test_no_keyboard() {
        assert_eq!(find_keyboard_event(""), None);
        let only_mouse = "N: Name=\"Mouse\"\nH: Handlers=mouse0 event2\nB: EV=17\n";
        assert_eq!(find_keyboard_event(only_mouse), None);
    }

    #[test]
    fn test_event_id_requires_digits() {
        let device = InputDevice {
            handlers: vec!["kbd".into(), "eventx".into()],
            ev: "120013".into(),
            ..Default::default()
        };
        assert_eq!(device.event_id(), None);
        assert!(!device.is_typing_keyboard());
    }

    #[test]
    fn test_device_path() {
        assert_eq!(device_path("3"), PathBuf::from("/dev/input/event3"));
    }

    #[test]
    fn test_open_missing_device() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_keyboard(dir.path().join("event99")).unwrap_err();
        assert!(matches!(err, Error::DeviceOpen { .. }));
        assert!(err.to_string().starts_with("Cannot open typing keyboard file"));
    }
}
