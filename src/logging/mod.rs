//! Declarative logging, construction-time, not process-global mutable state.
//!
//! Adapted from `lithair-core/src/logging/`. `init_logging` is called exactly once, at process
//! start, from `main.rs`; every other call site just uses the standard `log` macros.

pub mod config;
pub mod destinations;
pub mod formatter;
pub mod rotation;

pub use config::{LogLevel, LoggingConfig};
pub use destinations::LogOutput;
pub use formatter::LogFormat;
pub use rotation::{FileRotation, RotatingWriter};

use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initializes the hub's logging system. Safe to call multiple times; only the first call
/// takes effect.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    INIT.call_once(|| {
        let _ = init_logging_internal(config);
    });
    Ok(())
}

fn init_logging_internal(config: &LoggingConfig) -> anyhow::Result<()> {
    if config.outputs.is_empty() {
        // `log.logging_enabled = false`: install a no-op logger rather than silently falling
        // back to stdout, so "disabled" means disabled.
        log::set_max_level(log::LevelFilter::Off);
        return Ok(());
    }

    let logger = HubLogger::new(config.clone())?;
    log::set_boxed_logger(Box::new(logger))?;

    let max_level = match config.level {
        config::LogLevel::Error => log::LevelFilter::Error,
        config::LogLevel::Warn => log::LevelFilter::Warn,
        config::LogLevel::Info => log::LevelFilter::Info,
        config::LogLevel::Debug => log::LevelFilter::Debug,
        config::LogLevel::Trace => log::LevelFilter::Trace,
    };
    log::set_max_level(max_level);

    Ok(())
}

/// The hub's `log::Log` implementation: fans each record out to every configured sink.
struct HubLogger {
    config: LoggingConfig,
    writers: Vec<Arc<dyn LogWriter>>,
}

impl HubLogger {
    fn new(config: LoggingConfig) -> anyhow::Result<Self> {
        let mut writers: Vec<Arc<dyn LogWriter>> = Vec::new();

        for output in &config.outputs {
            match output {
                LogOutput::Stdout { format } => {
                    let fmt = format.as_ref().unwrap_or(&config.format);
                    writers.push(Arc::new(StdoutWriter::new(fmt.clone())));
                }
                LogOutput::Stderr { format } => {
                    let fmt = format.as_ref().unwrap_or(&config.format);
                    writers.push(Arc::new(StderrWriter::new(fmt.clone())));
                }
                LogOutput::File { path, rotation, max_files } => {
                    let writer = FileWriter::new(path, rotation.clone(), *max_files, config.format.clone())?;
                    writers.push(Arc::new(writer));
                }
            }
        }

        if writers.is_empty() {
            writers.push(Arc::new(StdoutWriter::new(config.format.clone())));
        }

        Ok(Self { config, writers })
    }
}

impl log::Log for HubLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let config_level: log::Level = self.config.level.clone().into();
        metadata.level() <= config_level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = destinations::LogEntry::from_log_record(record, &self.config);

        for writer in &self.writers {
            let _ = writer.write_log(&entry);
        }
    }

    fn flush(&self) {
        for writer in &self.writers {
            let _ = writer.flush();
        }
    }
}

trait LogWriter: Send + Sync {
    fn write_log(&self, entry: &destinations::LogEntry) -> anyhow::Result<()>;
    fn flush(&self) -> anyhow::Result<()>;
}

struct StdoutWriter {
    format: LogFormat,
}

impl StdoutWriter {
    fn new(format: LogFormat) -> Self {
        Self { format }
    }
}

impl LogWriter for StdoutWriter {
    fn write_log(&self, entry: &destinations::LogEntry) -> anyhow::Result<()> {
        println!("{}", self.format.format_entry(entry));
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        use std::io::{self, Write};
        io::stdout().flush()?;
        Ok(())
    }
}

struct StderrWriter {
    format: LogFormat,
}

impl StderrWriter {
    fn new(format: LogFormat) -> Self {
        Self { format }
    }
}

impl LogWriter for StderrWriter {
    fn write_log(&self, entry: &destinations::LogEntry) -> anyhow::Result<()> {
        eprintln!("{}", self.format.format_entry(entry));
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        use std::io::{self, Write};
        io::stderr().flush()?;
        Ok(())
    }
}

struct FileWriter {
    rotating_writer: rotation::RotatingWriter,
    format: LogFormat,
}

impl FileWriter {
    fn new(
        path: &str,
        rotation: rotation::FileRotation,
        max_files: Option<u32>,
        format: LogFormat,
    ) -> anyhow::Result<Self> {
        let rotating_writer = rotation::RotatingWriter::new(path, rotation, max_files)?;
        Ok(Self { rotating_writer, format })
    }
}

impl LogWriter for FileWriter {
    fn write_log(&self, entry: &destinations::LogEntry) -> anyhow::Result<()> {
        self.rotating_writer.write(self.format.format_entry(entry).as_bytes())
    }

    fn flush(&self) -> anyhow::Result<()> {
        self.rotating_writer.flush()
    }
}
