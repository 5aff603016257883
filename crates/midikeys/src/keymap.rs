//! Key code to MIDI note mapping table
//!
//! The table is filled through a [`KeyMapBuilder`] while the mapping file is
//! parsed and then frozen into a [`KeyMap`], which only offers lookups.

use std::collections::HashMap;

/// Lowest valid MIDI note number
pub const MIDI_NOTE_MIN: i32 = 0;

/// Highest valid MIDI note number
pub const MIDI_NOTE_MAX: i32 = 127;

/// Mutable table used while the mapping file is being read
#[derive(Debug, Default, Clone)]
pub struct KeyMapBuilder {
    entries: HashMap<i32, i32>,
}

impl KeyMapBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a key code to a note, replacing any earlier mapping for that code.
    ///
    /// Returns the note that was replaced, if any.
    pub fn insert(&mut self, key_code: i32, note: i32) -> Option<i32> {
        self.entries.insert(key_code, note)
    }

    /// Freeze the table
    pub fn build(self) -> KeyMap {
        KeyMap {
            entries: self.entries,
        }
    }
}

/// Immutable key code to note table
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyMap {
    entries: HashMap<i32, i32>,
}

impl KeyMap {
    /// Get the note mapped to a key code
    pub fn get(&self, key_code: i32) -> Option<i32> {
        self.entries.get(&key_code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(i32, i32)> for KeyMap {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        let mut builder = KeyMapBuilder::new();
        for (key_code, note) in iter {
            builder.insert(key_code, note);
        }
        builder.build()
    }
}

/// Whether a note number fits in a MIDI data byte
pub fn is_valid_note(note: i32) -> bool {
    (MIDI_NOTE_MIN..=MIDI_NOTE_MAX).contains(&note)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map() {
        let map = KeyMapBuilder::new().build();
        assert!(map.is_empty());
        assert_eq!(map.get(30), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut builder = KeyMapBuilder::new();
        assert_eq!(builder.insert(30, 60), None);
        assert_eq!(builder.insert(30, 64), Some(60));

        let map = builder.build();
        assert_eq!(map.get(30), Some(64));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_unchecked_range() {
        // Storage accepts anything; range is only checked at dispatch
        let map: KeyMap = [(1, -5), (2, 300)].into_iter().collect();
        assert_eq!(map.get(1), Some(-5));
        assert_eq!(map.get(2), Some(300));
        assert!(!is_valid_note(-5));
        assert!(!is_valid_note(300));
        assert!(is_valid_note(0));
        assert!(is_valid_note(127));
    }
}
