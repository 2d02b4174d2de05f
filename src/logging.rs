use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use env_logger::{Builder, Target, WriteStyle};

/// Location of the log file inside the data directory
pub fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("reflect.log")
}

/// Logger writing plain lines into `file`. Our own records honour `level`;
/// dependencies only get through at warn. The TUI owns the terminal, so nothing goes to stderr.
fn builder(file: File, level: log::LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .filter_module("reflect", level)
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .format_timestamp_secs();
    builder
}

/// Install the file logger. Failing to open the file leaves logging disabled
/// rather than aborting the program, so the error is returned for the caller to report.
pub fn init(data_dir: &Path, level: log::LevelFilter) -> std::io::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let path = log_file_path(data_dir);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    // A second init (tests, repeated CLI calls in one process) keeps the first logger
    if builder(file, level).try_init().is_err() {
        log::debug!("logger already installed, keeping it");
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record(level: log::Level, target: &str, message: std::fmt::Arguments, logger: &impl Log) {
        logger.log(&log::Record::builder().level(level).target(target).args(message).build());
    }

    #[test]
    fn records_are_appended_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_file_path(dir.path());
        let file = OpenOptions::new().create(true).append(true).open(&path).unwrap();
        let logger = builder(file, log::LevelFilter::Info).build();

        record(log::Level::Info, "reflect::api", format_args!("goal created"), &logger);
        record(log::Level::Debug, "reflect::api", format_args!("GET /goals"), &logger);
        record(log::Level::Info, "hyper::proto", format_args!("connection noise"), &logger);
        record(log::Level::Warn, "hyper::proto", format_args!("connection reset"), &logger);
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("goal created"));
        assert!(contents.contains("connection reset"));
        assert!(!contents.contains("GET /goals"));
        assert!(!contents.contains("connection noise"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn init_creates_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested");
        let path = init(&data_dir, log::LevelFilter::Debug).unwrap();
        assert_eq!(path, data_dir.join("reflect.log"));
        assert!(path.exists());
    }
}
