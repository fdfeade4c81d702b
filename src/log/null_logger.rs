use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Without a logger installed only the `log` crate's max level is kept in sync, so
    /// disabled macros stay cheap.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_level);
    }
}
