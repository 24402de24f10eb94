// Routes `log` records into the UI channel so they land in the logs panel
// instead of corrupting the alternate screen.

use crossbeam_channel::Sender;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::sync::OnceLock;

use crate::event::AppMsg;

pub struct ChannelLogger {
    level: LevelFilter,
    tx: OnceLock<Sender<AppMsg>>,
}

impl ChannelLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self {
            level,
            tx: OnceLock::new(),
        }
    }

    pub fn attach(&self, tx: Sender<AppMsg>) {
        let _ = self.tx.set(tx);
    }
}

/// `LEVEL: message`. The logs panel styles lines by this marker.
pub fn format_record(record: &Record) -> String {
    format!("{}: {}", record.level().as_str(), record.args())
}

impl Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(tx) = self.tx.get() {
            let _ = tx.send(AppMsg::LogMessage(format_record(record)));
        }
    }

    fn flush(&self) {}
}

/// Installs the global logger. Can only succeed once per process.
pub fn init(tx: Sender<AppMsg>, level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = Box::new(ChannelLogger::new(level));
    logger.attach(tx);
    log::set_boxed_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}
