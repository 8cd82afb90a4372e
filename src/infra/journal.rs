//! Reading the game's journal files.
//!
//! - Locates the newest `Journal.*.log` in the journal directory.
//! - Scans it newest-first for the carrier's last reported location.
//! - Tails it for events appended since the previous poll.

use std::{
    fs::{self, File},
    io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde_json::Value;

use crate::domain::{events::EVENT_CARRIER_LOCATION, CarrierLocation, Settings};
use crate::error::MonitorError;

const JOURNAL_PREFIX: &str = "Journal.";
const JOURNAL_SUFFIX: &str = ".log";

/// `%USERPROFILE%\Saved Games\Frontier Developments\Elite Dangerous`, where
/// the game writes its journal on Windows.
pub fn default_journal_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join("Saved Games")
            .join("Frontier Developments")
            .join("Elite Dangerous")
    })
}

fn is_journal_name(name: &str) -> bool {
    name.len() > JOURNAL_PREFIX.len() + JOURNAL_SUFFIX.len()
        && name.starts_with(JOURNAL_PREFIX)
        && name.ends_with(JOURNAL_SUFFIX)
}

/// Most recently modified journal file, or `None` when the directory is
/// missing, cannot be listed, or holds no journals.
pub fn latest_journal(dir: &Path) -> Result<Option<PathBuf>, MonitorError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
        Err(err) => {
            log::warn!("Cannot list journal directory {}: {err}", dir.display());
            return Ok(None);
        }
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if !name.to_str().map(is_journal_name).unwrap_or(false) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let path = entry.path();
        let replace = match &newest {
            None => true,
            // Names embed the session start, so they break mtime ties.
            Some((best_time, best_path)) => {
                modified > *best_time || (modified == *best_time && path > *best_path)
            }
        };
        if replace {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Star system from the newest `CarrierLocation` event in the newest journal
/// that belongs to the configured carrier.
pub fn find_latest_carrier_location(
    dir: &Path,
    settings: &Settings,
) -> Result<Option<String>, MonitorError> {
    let Some(path) = latest_journal(dir)? else {
        log::debug!("No journal files found in {}", dir.display());
        return Ok(None);
    };
    let bytes = fs::read(&path)
        .map_err(|err| MonitorError::io(format!("reading {}", path.display()), err))?;
    let content = String::from_utf8_lossy(&bytes);

    for line in content.lines().rev() {
        if !line.contains(EVENT_CARRIER_LOCATION) {
            continue;
        }
        let entry: Value = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("Skipping malformed journal line in {}: {err}", path.display());
                continue;
            }
        };
        let Some(location) = CarrierLocation::from_entry(&entry) else {
            continue;
        };
        if settings.accepts_carrier(location.carrier_id.as_deref()) {
            return Ok(Some(location.star_system));
        }
    }
    Ok(None)
}

/// Incremental reader over the newest journal.
#[derive(Debug, Default)]
pub struct JournalTail {
    current: Option<PathBuf>,
    offset: u64,
}

impl JournalTail {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Complete events appended since the last call, in file order. A line
    /// still being written is left for the next call.
    pub fn read_new_events(&mut self, dir: &Path) -> Result<Vec<Value>, MonitorError> {
        let Some(latest) = latest_journal(dir)? else {
            return Ok(Vec::new());
        };
        if self.current.as_ref() != Some(&latest) {
            log::info!("Following journal {}", latest.display());
            self.current = Some(latest.clone());
            self.offset = 0;
        }

        let io_err = |err| MonitorError::io(format!("reading {}", latest.display()), err);
        let mut file = File::open(&latest).map_err(io_err)?;
        let len = file.metadata().map_err(io_err)?.len();
        if len < self.offset {
            log::warn!("Journal {} shrank; rereading from the start", latest.display());
            self.offset = 0;
        }
        file.seek(SeekFrom::Start(self.offset)).map_err(io_err)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(io_err)?;

        let Some(last_newline) = buf.iter().rposition(|b| *b == b'\n') else {
            return Ok(Vec::new());
        };
        let complete = &buf[..=last_newline];
        self.offset += complete.len() as u64;

        let mut events = Vec::new();
        for line in String::from_utf8_lossy(complete).lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(event) => events.push(event),
                Err(err) => log::debug!("Skipping malformed journal line: {err}"),
            }
        }
        Ok(events)
    }
}
