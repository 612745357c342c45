use log::{Level, LevelFilter, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogInitError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("a logger is already installed")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

struct FileLogger {
    file_path: PathBuf,
    level: Level,
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)
            {
                let _ = writeln!(
                    file,
                    "[{}] {}: {}",
                    record.level(),
                    record.target(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {}
}

/// Installs a logger appending `debug` and above to `path`.
pub fn init_logger(path: impl AsRef<Path>) -> Result<(), LogInitError> {
    init_logger_with_level(path, LevelFilter::Debug)
}

/// Installs a logger appending records up to `level` to `path`.
///
/// Fails if `path` cannot be opened for appending or if a logger is
/// already installed.
pub fn init_logger_with_level(
    path: impl AsRef<Path>,
    level: LevelFilter,
) -> Result<(), LogInitError> {
    let file_path = path.as_ref().to_path_buf();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&file_path)
        .map_err(|source| LogInitError::Open {
            path: file_path.clone(),
            source,
        })?;

    let logger = FileLogger {
        file_path,
        level: level.to_level().unwrap_or(Level::Error),
    };
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}
