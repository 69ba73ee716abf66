//! SSID sources
//!
//! A list of popular network names, one per line. Lines whose first
//! non-blank character is `#` are comments; only the first
//! whitespace-delimited token of a line is the name.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{KnownBeaconsError, Result};

/// Where the generator reads network names from
pub trait SsidSource {
    /// Human-readable origin, for logs
    fn describe(&self) -> String;

    /// Read the raw text lines
    fn read_lines(&self) -> Result<Vec<String>>;

    /// Read and parse into SSIDs, preserving order
    fn read_ssids(&self) -> Result<Vec<String>> {
        Ok(self
            .read_lines()?
            .iter()
            .filter_map(|line| parse_ssid_line(line))
            .map(str::to_string)
            .collect())
    }
}

/// Extract the SSID from one line, if the line carries one
pub fn parse_ssid_line(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    line.split_whitespace().next()
}

fn is_comment(raw: &[u8]) -> bool {
    raw.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'#')
}

/// SSID list on disk
#[derive(Debug, Clone)]
pub struct SsidFile {
    path: PathBuf,
}

impl SsidFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SsidSource for SsidFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        let bytes = std::fs::read(&self.path).map_err(|source| {
            KnownBeaconsError::ResourceUnavailable {
                path: self.path.clone(),
                source,
            }
        })?;

        // Names are sent byte for byte; invalid UTF-8 lines are dropped, never repaired
        let mut lines = Vec::new();
        for (n, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            match std::str::from_utf8(raw) {
                Ok(line) => lines.push(line.to_string()),
                Err(_) if is_comment(raw) => {}
                Err(e) => warn!(
                    "{}:{}: skipping line that is not valid UTF-8: {}",
                    self.path.display(),
                    n + 1,
                    e
                ),
            }
        }
        Ok(lines)
    }
}

/// In-memory SSID list, for hosts that already hold the names
#[derive(Debug, Clone, Default)]
pub struct SsidList {
    lines: Vec<String>,
}

impl SsidList {
    pub fn new<I, T>(lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl SsidSource for SsidList {
    fn describe(&self) -> String {
        format!("in-memory list ({} lines)", self.lines.len())
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}
