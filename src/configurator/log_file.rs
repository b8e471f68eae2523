//! Extra plain log file at a caller-chosen path

use super::LogConfigurator;
use crate::appenders::FileAppender;
use crate::core::appender::AppenderHandle;
use crate::core::error::Result;
use crate::core::layout::Layout;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Prefix of the appender names created by [`LogConfigurator::add_log_file`]
pub const LOG_FILE_APPENDER_PREFIX: &str = "File:";

impl LogConfigurator {
    /// Write everything logged from now on to `path` as well.
    ///
    /// The file is attached to the root logger and every registered logger
    /// except the trace logger, whose output stays on its own appender.
    /// Returns `Ok(false)` for an empty path, a path already added, or a file
    /// some registered appender already writes (two handles on one file would
    /// contend for its lock).
    ///
    /// # Errors
    ///
    /// Parent directory creation, opening or locking the file
    pub fn add_log_file(&self, path: &str) -> Result<bool> {
        let path = path.trim();
        if path.is_empty() {
            return Ok(false);
        }
        let name = format!("{}{}", LOG_FILE_APPENDER_PREFIX, path);
        if self.registry.has_appender(&name) || self.is_file_in_use(Path::new(path)) {
            return Ok(false);
        }

        let handle = AppenderHandle::new(name.as_str(), FileAppender::new(Path::new(path))?)
            .with_layout(Layout::default())
            .shared();
        let handle = self.registry.register_appender(handle)?;

        for logger in self.registry.all_loggers() {
            if logger.name() == self.settings.trace_logger {
                continue;
            }
            logger.add_appender(Arc::clone(&handle));
        }
        Ok(true)
    }

    fn is_file_in_use(&self, path: &Path) -> bool {
        let wanted = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.registry
            .appenders()
            .iter()
            .filter_map(|appender| appender.path())
            .any(|owned| fs::canonicalize(&owned).unwrap_or(owned) == wanted)
    }
}
