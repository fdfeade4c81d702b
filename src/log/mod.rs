//! Diagnostic logging for the simulator.
//!
//! Logging is separate from the run summary: the summary is the result of a run, while log
//! messages describe how it got there (population setup, daily counts, mandate changes and,
//! at `trace`, individual transmissions). Messages go to stderr.
//!
//! The five `log` macros are re-exported from here. Logging is off until a level is set:
//!
//! ```rust
//! use virus_sim::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! // Daily counts and mandate changes.
//! set_log_level(LevelFilter::Info);
//! // Every committed infection, recovery and death.
//! set_module_filter("virus_sim::simulation", LevelFilter::Debug);
//! ```
//!
//! Without the `logging` feature the level is still tracked, but nothing is written.
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

use std::collections::BTreeMap;
use std::sync::{LazyLock, Mutex, MutexGuard};

pub use log::{debug, error, info, trace, warn, LevelFilter};
#[cfg(feature = "logging")]
use log4rs::Handle;

/// Modules that are capped below the global level unless overridden. Graph generation
/// traces every edge it adds.
const DEFAULT_MODULE_FILTERS: [(&str, LevelFilter); 1] =
    [("virus_sim::contact_graph", LevelFilter::Info)];

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// The installed logging state. Module filters are kept sorted by path so the logger
/// configuration built from them is the same on every run.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    pub(in crate::log) global_level: LevelFilter,
    pub(in crate::log) module_levels: BTreeMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_level: LevelFilter::Off,
            module_levels: DEFAULT_MODULE_FILTERS
                .iter()
                .map(|&(module, level)| (module.to_string(), level))
                .collect(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    /// Returns whether the filter changed.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        self.module_levels.insert(module.to_string(), level) != Some(level)
    }
}

/// Turns on every log message. Same as `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Turns off every log message. Same as `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the level for modules without their own filter.
pub fn set_log_level(level: LevelFilter) {
    let mut config = get_log_configuration();
    config.global_level = level;
    config.set_config();
}

/// Sets the level for one module path, e.g. `"virus_sim::population"`.
pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    let mut config = get_log_configuration();
    if config.insert_module_filter(module_path, level) {
        config.set_config();
    }
}

/// Sets several module filters, rebuilding the logger once.
pub fn set_module_filters<S: AsRef<str>>(module_filters: &[(S, LevelFilter)]) {
    let mut config = get_log_configuration();
    let mut changed = false;
    for (module, level) in module_filters {
        changed |= config.insert_module_filter(module.as_ref(), *level);
    }
    if changed {
        config.set_config();
    }
}

/// Drops the filter for `module_path`, which then follows the global level.
pub fn remove_module_filter(module_path: &str) {
    let mut config = get_log_configuration();
    if config.module_levels.remove(module_path).is_some() {
        config.set_config();
    }
}

#[must_use]
pub fn get_log_level() -> LevelFilter {
    get_log_configuration().global_level
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
