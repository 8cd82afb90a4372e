//! Single-row CSV mirror of the carrier status.

use std::{
    fs,
    io::ErrorKind as IoErrorKind,
    path::{Path, PathBuf},
};

use crate::domain::CarrierStatus;
use crate::error::MonitorError;

pub const STATUS_FILENAME: &str = "fc_status.csv";

const COLUMNS: [&str; 4] = ["name", "location", "fuel", "credits"];

#[derive(Clone, Debug)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STATUS_FILENAME),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no status has been saved yet.
    pub fn load(&self) -> Result<Option<CarrierStatus>, MonitorError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(MonitorError::io(
                    format!("reading {}", self.path.display()),
                    err,
                ))
            }
        };
        parse_status(&content).map(Some)
    }

    /// Overwrites the file wholesale with a header and one data row.
    pub fn save(&self, status: &CarrierStatus) -> Result<(), MonitorError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| MonitorError::io(format!("creating {}", parent.display()), err))?;
        }
        fs::write(&self.path, render_status(status))
            .map_err(|err| MonitorError::io(format!("writing {}", self.path.display()), err))
    }
}

fn render_status(status: &CarrierStatus) -> String {
    let fuel = status.fuel.to_string();
    let row = [
        status.name.as_str(),
        status.location.as_str(),
        fuel.as_str(),
        status.credits.as_str(),
    ];
    format!("{}\r\n{}\r\n", join_record(&COLUMNS), join_record(&row))
}

/// Columns are matched by header name, so reordered files still load and
/// missing columns keep their defaults.
fn parse_status(content: &str) -> Result<CarrierStatus, MonitorError> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| MonitorError::parse("status file", "file is empty"))?;
    let header = split_record(header)?;
    let mut status = CarrierStatus::default();
    let Some(row) = lines.next() else {
        return Ok(status);
    };
    let row = split_record(row)?;

    for (column, value) in header.iter().zip(row) {
        match column.as_str() {
            "name" => status.name = value,
            "location" => status.location = value,
            "fuel" => {
                status.fuel = value.trim().parse().map_err(|_| {
                    MonitorError::parse("status file", format!("fuel '{value}' is not a number"))
                })?
            }
            "credits" => status.credits = value,
            _ => {}
        }
    }
    Ok(status)
}

fn join_record(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| quote_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn split_record(line: &str) -> Result<Vec<String>, MonitorError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match (ch, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            (other, _) => current.push(other),
        }
    }

    if in_quotes {
        return Err(MonitorError::parse("status file", "unterminated quoted field"));
    }
    fields.push(current);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample() -> CarrierStatus {
        CarrierStatus {
            name: "Hen, \"Wandering\"".into(),
            location: "Colonia".into(),
            fuel: 640,
            credits: "1,234,567".into(),
        }
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn saved_row_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::in_dir(dir.path());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn file_layout_quotes_formatted_credits() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::in_dir(dir.path());
        store.save(&sample()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            raw,
            "name,location,fuel,credits\r\n\"Hen, \"\"Wandering\"\"\",Colonia,640,\"1,234,567\"\r\n"
        );
    }

    #[test]
    fn reordered_and_partial_columns() {
        let status = parse_status("location,name\nSol,Ark\n").unwrap();
        assert_eq!(status.location, "Sol");
        assert_eq!(status.name, "Ark");
        assert_eq!(status.fuel, 0);
        assert_eq!(status.credits, "0");
    }

    #[test]
    fn header_only_yields_defaults() {
        let status = parse_status("name,location,fuel,credits\r\n").unwrap();
        assert_eq!(status, CarrierStatus::default());
    }

    #[test]
    fn bad_fuel_is_parse_failure() {
        let err = parse_status("name,location,fuel,credits\nA,B,lots,0\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
        let err = parse_status("name\n\"open\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }
}
