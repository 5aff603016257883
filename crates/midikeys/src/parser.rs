//! Keyboard mapping file parser
//!
//! The mapping file is plain text with one `<key-code>=<note>` pair per line:
//!
//! ```text
//! # not a comment, this line is reported and skipped
//! 30 = 60
//! 31=62
//! ```
//!
//! All whitespace is ignored and blank lines are skipped. A malformed line is
//! reported with its line number and parsing goes on with the next one, so a
//! typo never costs the rest of the map. Later definitions of the same key
//! code replace earlier ones.

use crate::error::{Error, Result};
use crate::keymap::{is_valid_note, KeyMap, KeyMapBuilder};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Why a single line of the mapping file was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// The line did not split into exactly `key=note`
    #[error("Keyboard mapping must have 2 parts: {line}")]
    PartCount { line: String, parts: usize },

    /// One side of the `=` is not a base-10 integer
    #[error("Keyboard mapping must have numbers on both sides of '=': {line}")]
    NotANumber { line: String },
}

/// A rejected line, with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWarning {
    pub line_number: usize,
    pub error: LineError,
}

/// Result of parsing a whole mapping source
#[derive(Debug, Clone)]
pub struct ParseReport {
    /// The frozen mapping table
    pub keymap: KeyMap,
    /// Every line that was skipped because it was malformed
    pub warnings: Vec<LineWarning>,
}

/// Parse a single line of the mapping file.
///
/// Returns `Ok(None)` for lines that are empty once whitespace is removed.
pub fn parse_line(line: &str) -> std::result::Result<Option<(i32, i32)>, LineError> {
    let stripped: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = stripped.split('=').collect();
    if parts.len() != 2 {
        return Err(LineError::PartCount {
            parts: parts.len(),
            line: stripped,
        });
    }

    match (parts[0].parse::<i32>(), parts[1].parse::<i32>()) {
        (Ok(key_code), Ok(note)) => Ok(Some((key_code, note))),
        _ => Err(LineError::NotANumber { line: stripped }),
    }
}

/// Parse mapping text into a table, collecting malformed lines.
pub fn parse_str(content: &str) -> ParseReport {
    let mut builder = KeyMapBuilder::new();
    let mut warnings = Vec::new();

    for (index, line) in content.lines().enumerate() {
        match parse_line(line) {
            Ok(Some((key_code, note))) => {
                log::debug!("Mapping typing key code to note: {}={}", key_code, note);
                if !is_valid_note(note) {
                    log::warn!(
                        "Line {}: note {} for key code {} is outside 0-127",
                        index + 1,
                        note,
                        key_code
                    );
                }
                builder.insert(key_code, note);
            }
            Ok(None) => {}
            Err(error) => warnings.push(LineWarning {
                line_number: index + 1,
                error,
            }),
        }
    }

    ParseReport {
        keymap: builder.build(),
        warnings,
    }
}

/// Load and parse a mapping file.
///
/// Only an unreadable file is an error; malformed lines are logged with the
/// file path and line number and returned in the report.
pub fn load_key_map(path: impl AsRef<Path>) -> Result<ParseReport> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::MapFile {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);

    let report = parse_str(&content);
    for warning in &report.warnings {
        log::warn!(
            "Line: {} in {} Error: {}",
            warning.line_number,
            path.display(),
            warning.error
        );
    }
    if report.keymap.is_empty() {
        log::warn!("No key mappings loaded from {}", path.display());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line_valid() {
        assert_eq!(parse_line("30=60"), Ok(Some((30, 60))));
        assert_eq!(parse_line("  30 = 6 0 \t"), Ok(Some((30, 60))));
        assert_eq!(parse_line("-1=+5"), Ok(Some((-1, 5))));
    }

    #[test]
    fn test_parse_line_blank() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t \r"), Ok(None));
    }

    #[test]
    fn test_parse_line_part_count() {
        assert!(matches!(
            parse_line("bad-line"),
            Err(LineError::PartCount { parts: 1, .. })
        ));
        assert!(matches!(
            parse_line("1=2=3"),
            Err(LineError::PartCount { parts: 3, .. })
        ));
    }

    #[test]
    fn test_parse_line_not_a_number() {
        assert!(matches!(parse_line("a=60"), Err(LineError::NotANumber { .. })));
        assert!(matches!(parse_line("30=b"), Err(LineError::NotANumber { .. })));
        assert!(matches!(parse_line("=60"), Err(LineError::NotANumber { .. })));
        assert!(matches!(parse_line("30="), Err(LineError::NotANumber { .. })));
        assert!(matches!(parse_line("30=0x3c"), Err(LineError::NotANumber { .. })));
    }

    #[test]
    fn test_parse_str_scenario() {
        let report = parse_str("30=60\n31=62\nbad-line\n30=64");
        assert_eq!(report.keymap.get(30), Some(64));
        assert_eq!(report.keymap.get(31), Some(62));
        assert_eq!(report.keymap.len(), 2);

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line_number, 3);
        assert!(matches!(report.warnings[0].error, LineError::PartCount { .. }));
    }

    #[test]
    fn test_bad_lines_do_not_stop_parsing() {
        let content = "\n1=2=3\nx=y\n=\n44=48\n\n45 = 50\n";
        let report = parse_str(content);
        assert_eq!(report.keymap.len(), 2);
        assert_eq!(report.keymap.get(44), Some(48));
        assert_eq!(report.keymap.get(45), Some(50));

        let lines: Vec<_> = report.warnings.iter().map(|w| w.line_number).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn test_no_valid_lines_is_empty_not_error() {
        let report = parse_str("\n\nnothing here\n");
        assert!(report.keymap.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_load_key_map_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "30=60").unwrap();
        writeln!(file, "31=62").unwrap();
        writeln!(file, "oops").unwrap();
        file.flush().unwrap();

        let report = load_key_map(file.path()).unwrap();
        assert_eq!(report.keymap.get(30), Some(60));
        assert_eq!(report.keymap.get(31), Some(62));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_load_key_map_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.map");
        let err = load_key_map(&path).unwrap_err();
        assert!(matches!(err, Error::MapFile { .. }));
        assert!(err.to_string().contains("missing.map"));
    }
}
