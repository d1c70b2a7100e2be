//! Location and naming of a node's log files.

use std::path::{Path, PathBuf};

use crate::category::LogCategory;

/// Default prefix for log file names.
pub const DEFAULT_FILE_PREFIX: &str = "claw";

/// Where a node writes its log files and how they are named.
///
/// Level logs are named `{prefix}-{ordinal}-{level}.log` (for example
/// `claw-2-debug.log`); the HTTP access log is `{prefix}-httpd.log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirectory {
    dir: PathBuf,
    prefix: String,
}

impl LogDirectory {
    /// Creates a directory description with the default prefix.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }

    /// Sets the file prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The directory path.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// File name for a category, or `None` for stdout/stderr.
    #[must_use]
    pub fn file_name(&self, category: LogCategory) -> Option<String> {
        match (category, category.level_ordinal()) {
            (_, Some(ordinal)) => Some(format!("{}-{ordinal}-{category}.log", self.prefix)),
            (LogCategory::Httpd, None) => Some(format!("{}-httpd.log", self.prefix)),
            _ => None,
        }
    }

    /// Full path for a category, or `None` for stdout/stderr.
    #[must_use]
    pub fn path_for(&self, category: LogCategory) -> Option<PathBuf> {
        self.file_name(category).map(|name| self.dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(LogCategory::Trace, "claw-1-trace.log")]
    #[test_case(LogCategory::Debug, "claw-2-debug.log")]
    #[test_case(LogCategory::Info, "claw-3-info.log")]
    #[test_case(LogCategory::Warn, "claw-4-warn.log")]
    #[test_case(LogCategory::Error, "claw-5-error.log")]
    #[test_case(LogCategory::Fatal, "claw-6-fatal.log")]
    #[test_case(LogCategory::Httpd, "claw-httpd.log")]
    fn file_names(category: LogCategory, expected: &str) {
        let dir = LogDirectory::new("/var/log/claw");
        assert_eq!(dir.file_name(category).as_deref(), Some(expected));
    }

    #[test]
    fn streams_have_no_file() {
        let dir = LogDirectory::new("/var/log/claw");
        assert!(dir.path_for(LogCategory::Stdout).is_none());
        assert!(dir.path_for(LogCategory::Stderr).is_none());
    }

    #[test]
    fn custom_prefix_and_path() {
        let dir = LogDirectory::new("/data/logs").with_prefix("node-a_10.0.0.1_54321");
        assert_eq!(dir.prefix(), "node-a_10.0.0.1_54321");
        assert_eq!(
            dir.path_for(LogCategory::Warn),
            Some(PathBuf::from("/data/logs/node-a_10.0.0.1_54321-4-warn.log"))
        );
    }
}
