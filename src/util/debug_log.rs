//! File-backed `log` sink with single-generation rotation.
//!
//! Records go to `fleetcarriermonitor_debug.log` in the plugin directory.
//! Once the next line would take the file past the size cap, the file is
//! renamed to `<name>.1` (replacing the previous backup) and a fresh file is
//! started.

use std::{
    ffi::OsString,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Mutex, PoisonError},
};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::{macros::format_description, OffsetDateTime};

pub const DEBUG_LOG_FILENAME: &str = "fleetcarriermonitor_debug.log";
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
const LEVEL_ENV: &str = "FCM_LOG";

pub struct DebugLog {
    path: PathBuf,
    max_bytes: u64,
    level: LevelFilter,
    echo_to_console: bool,
    // Callbacks from the UI and the poller may log at the same time.
    write_lock: Mutex<()>,
}

impl DebugLog {
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            path: path.into(),
            max_bytes,
            level: LevelFilter::Debug,
            echo_to_console: false,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_console_echo(mut self, echo: bool) -> Self {
        self.echo_to_console = echo;
        self
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".1");
        PathBuf::from(name)
    }

    /// Appends `line` plus a newline, rotating first when needed.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let incoming = line.len() as u64 + 1;
        let current = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        if current > 0 && current + incoming > self.max_bytes {
            self.rotate()?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }

    fn rotate(&self) -> io::Result<()> {
        let backup = self.backup_path();
        match fs::remove_file(&backup) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        fs::rename(&self.path, &backup)
    }
}

impl Log for DebugLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{stamp}] {level:<5} {target}: {message}",
            stamp = timestamp(),
            level = record.level(),
            target = record.target(),
            message = record.args(),
        );
        if self.echo_to_console && record.level() <= Level::Info {
            println!("{line}");
        }
        if let Err(err) = self.write_line(&line) {
            eprintln!("[debug-log] failed to write {}: {err}", self.path.display());
        }
    }

    fn flush(&self) {}
}

fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Installs the debug log as the global logger and writes a session marker.
pub fn init(plugin_dir: &Path) -> Result<(), SetLoggerError> {
    let level = std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|raw| LevelFilter::from_str(raw.trim()).ok())
        .unwrap_or(LevelFilter::Debug);
    if let Err(err) = fs::create_dir_all(plugin_dir) {
        eprintln!("[debug-log] cannot create {}: {err}", plugin_dir.display());
    }
    let logger = DebugLog::new(plugin_dir.join(DEBUG_LOG_FILENAME), DEFAULT_MAX_BYTES)
        .with_level(level)
        .with_console_echo(true);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    log::info!("Session {} started", uuid::Uuid::new_v4());
    Ok(())
}
