use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, Sink, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};

use crate::config::{Config, LogLevel};

const MAX_LOG_FILES: usize = 30;

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

/// Below warn goes to stdout, warn and above to stderr.
fn console_sinks() -> spdlog::Result<Vec<Arc<dyn Sink>>> {
    let stdout = StdStreamSink::builder()
        .std_stream(StdStream::Stdout)
        .level_filter(LevelFilter::MoreVerbose(Level::Warn))
        .build()?;
    let stderr = StdStreamSink::builder()
        .std_stream(StdStream::Stderr)
        .level_filter(LevelFilter::MoreSevereEqual(Level::Warn))
        .build()?;

    Ok(vec![Arc::new(stdout), Arc::new(stderr)])
}

fn daily_file_sink(location: &Path) -> spdlog::Result<Arc<dyn Sink>> {
    let sink = RotatingFileSink::builder()
        .base_path(location)
        .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
        .max_files(MAX_LOG_FILES)
        .rotate_on_open(false)
        .build()?;
    Ok(Arc::new(sink))
}

/// Replaces the default logger according to `[log]`. Without that section the
/// spdlog console logger stays in place. A section without a location logs to
/// the console only, at the configured level.
pub fn configure_logger(config: &Config) -> spdlog::Result<()> {
    let Some(ref log) = config.log else {
        return Ok(());
    };

    let mut sinks = vec![];
    match log.location {
        Some(ref location) => {
            sinks.push(daily_file_sink(location)?);
            if log.log_to_console {
                sinks.extend(console_sinks()?);
            }
        }
        None => sinks.extend(console_sinks()?),
    }

    let mut builder = Logger::builder();
    for sink in sinks {
        builder.sink(sink);
    }
    let logger = Arc::new(builder.build()?);
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    logger.set_level_filter(LevelFilter::MoreSevereEqual(log.level.into()));

    spdlog::set_default_logger(logger);

    Ok(())
}
