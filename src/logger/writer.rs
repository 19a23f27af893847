//! Log writer module
//!
//! Process-wide log sinks. Each sink is stdout/stderr or an append-mode
//! file; files can be reopened in place after external rotation.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use super::Level;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File { path: String, file: File },
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File {
                path: p.to_string(),
                file: open_log_file(p)?,
            }),
            None => Ok(fallback),
        }
    }

    fn write_line(&mut self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File { file, .. } => {
                // Nowhere left to report a failed log write
                let _ = writeln!(file, "{message}");
            }
        }
    }

    fn reopen(&mut self) -> io::Result<()> {
        if let Self::File { path, file } = self {
            *file = open_log_file(path)?;
        }
        Ok(())
    }
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access and info messages
    access: Mutex<LogTarget>,
    /// Warnings and errors
    error: Mutex<LogTarget>,
    max_level: Level,
}

impl LogWriter {
    fn new(
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
        max_level: Level,
    ) -> io::Result<Self> {
        Ok(Self {
            access: Mutex::new(LogTarget::open(access_log_file, LogTarget::Stdout)?),
            error: Mutex::new(LogTarget::open(error_log_file, LogTarget::Stderr)?),
            max_level,
        })
    }

    pub const fn max_level(&self) -> Level {
        self.max_level
    }

    pub fn write_access(&self, message: &str) {
        lock(&self.access).write_line(message);
    }

    pub fn write_info(&self, message: &str) {
        lock(&self.access).write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        lock(&self.error).write_line(message);
    }

    /// Reopen file sinks at their configured paths (after logrotate moved them)
    pub fn reopen(&self) -> io::Result<()> {
        lock(&self.access).reopen()?;
        lock(&self.error).reopen()
    }
}

/// A panic while holding a sink leaves it usable; keep logging.
fn lock(target: &Mutex<LogTarget>) -> MutexGuard<'_, LogTarget> {
    target.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Call once at startup. Fails if a log file cannot be opened or the
/// writer was already initialized.
pub fn init(
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
    max_level: Level,
) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file, max_level)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// The global log writer, if [`init`] has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/access.log");
        let path_str = path.to_str().unwrap();

        let writer = LogWriter::new(Some(path_str), None, Level::Info).unwrap();
        writer.write_access("first");

        let rotated = dir.path().join("logs/access.log.1");
        std::fs::rename(&path, &rotated).unwrap();
        writer.reopen().unwrap();
        writer.write_access("second");

        assert_eq!(std::fs::read_to_string(&rotated).unwrap(), "first\n");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
    }
}
