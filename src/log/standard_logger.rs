use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use crate::log::LogConfiguration;

// ISO 8601 timestamp, colored level, module path
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";
const APPENDER: &str = "stderr";

impl LogConfiguration {
    /// Installs or updates the `log4rs` logger to match this configuration. Stdout is left
    /// to the run summary.
    pub(in crate::log) fn set_config(&mut self) {
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        let loggers = self
            .module_levels
            .iter()
            .map(|(module, level)| Logger::builder().build(module.clone(), *level));
        let config = Config::builder()
            .appender(Appender::builder().build(APPENDER, Box::new(stderr)))
            .loggers(loggers)
            .build(Root::builder().appender(APPENDER).build(self.global_level));

        let config = match config {
            Ok(config) => config,
            Err(e) => {
                eprintln!("invalid logger configuration: {e}");
                log::set_max_level(self.global_level);
                return;
            }
        };

        match self.root_handle {
            Some(ref handle) => handle.set_config(config),
            None => match log4rs::init_config(config) {
                Ok(handle) => self.root_handle = Some(handle),
                Err(e) => {
                    // Another logger was installed first, e.g. by an embedding program.
                    eprintln!("failed to install logger: {e}");
                    log::set_max_level(self.global_level);
                }
            },
        }
    }
}
