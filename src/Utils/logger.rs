use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Cannot create log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Logger is already set: {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Terminal logger at `level`, messages go to stderr.
pub fn init_logger(level: LevelFilter) -> Result<(), LoggerError> {
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    Ok(())
}

/// Terminal logger plus a copy of every message in `log_file`.
pub fn init_logger_with_file(level: LevelFilter, log_file: &Path) -> Result<(), LoggerError> {
    let file = File::create(log_file)?;
    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(level, Config::default(), file),
    ];
    CombinedLogger::init(loggers)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::info;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn file_logger_writes_and_is_set_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("elytra.log");
        init_logger_with_file(LevelFilter::Info, &path).unwrap();
        info!("logger test message");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("logger test message"));
        assert!(matches!(
            init_logger(LevelFilter::Info),
            Err(LoggerError::AlreadySet(_))
        ));
    }
}
