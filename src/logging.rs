use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const LOG_FILE_NAME: &str = "log.txt";

#[derive(Debug)]
struct SimpleLogger {
    log_file: PathBuf,
    max_level: LevelFilter,
}

static LOGGER: OnceCell<SimpleLogger> = OnceCell::new();

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "[{}] {} {} - {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            );

            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)
            {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

// Installs the file logger. Only the first call in a process can succeed.
pub fn init(log_dir: &Path, max_level: LevelFilter) -> Result<PathBuf> {
    create_dir_all(log_dir)?;
    let log_file = log_dir.join(LOG_FILE_NAME);

    let logger = LOGGER.get_or_init(|| SimpleLogger {
        log_file: log_file.clone(),
        max_level,
    });

    log::set_logger(logger)?;
    log::set_max_level(max_level);
    Ok(logger.log_file.clone())
}
