//! Log categories a node can serve.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// Name that aliases the debug log.
pub const DEFAULT_CATEGORY: &str = "default";

/// Characters that separate path components on any supported host.
pub const PATH_SEPARATORS: [char; 2] = ['/', '\\'];

/// A named class of log content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    /// Trace-level log file.
    Trace,
    /// Debug-level log file.
    Debug,
    /// Info-level log file.
    Info,
    /// Warn-level log file.
    Warn,
    /// Error-level log file.
    Error,
    /// Fatal-level log file.
    Fatal,
    /// HTTP access log file.
    Httpd,
    /// The process's standard output.
    Stdout,
    /// The process's standard error.
    Stderr,
}

impl LogCategory {
    /// All categories, in level order followed by the special ones.
    pub const ALL: [Self; 9] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
        Self::Httpd,
        Self::Stdout,
        Self::Stderr,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Httpd => "httpd",
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }

    /// Level ordinal used in level log file names.
    #[must_use]
    pub const fn level_ordinal(&self) -> Option<u8> {
        match self {
            Self::Trace => Some(1),
            Self::Debug => Some(2),
            Self::Info => Some(3),
            Self::Warn => Some(4),
            Self::Error => Some(5),
            Self::Fatal => Some(6),
            Self::Httpd | Self::Stdout | Self::Stderr => None,
        }
    }

    /// Returns true for stdout/stderr, which are served from the
    /// process's descriptor table rather than the log directory.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self, Self::Stdout | Self::Stderr)
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogCategory {
    type Err = LogError;

    fn from_str(name: &str) -> Result<Self> {
        validate_category_name(name)?;
        match name {
            DEFAULT_CATEGORY | "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "httpd" => Ok(Self::Httpd),
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(LogError::invalid_category(
                name,
                "illegal log file name requested (try 'default')",
            )),
        }
    }
}

/// Rejects names that could address anything outside the log directory.
///
/// # Errors
///
/// Returns [`LogError::InvalidCategory`] if the name contains a path
/// separator or a null byte.
pub fn validate_category_name(name: &str) -> Result<()> {
    if name.contains(PATH_SEPARATORS) {
        return Err(LogError::invalid_category(
            name,
            "name may not contain a path separator",
        ));
    }
    if name.contains('\0') {
        return Err(LogError::invalid_category(name, "name may not contain a null byte"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("default", LogCategory::Debug)]
    #[test_case("debug", LogCategory::Debug)]
    #[test_case("trace", LogCategory::Trace)]
    #[test_case("info", LogCategory::Info)]
    #[test_case("warn", LogCategory::Warn)]
    #[test_case("error", LogCategory::Error)]
    #[test_case("fatal", LogCategory::Fatal)]
    #[test_case("httpd", LogCategory::Httpd)]
    #[test_case("stdout", LogCategory::Stdout)]
    #[test_case("stderr", LogCategory::Stderr)]
    fn accepted_names(name: &str, expected: LogCategory) {
        assert_eq!(name.parse::<LogCategory>().ok(), Some(expected));
    }

    #[test_case("" ; "empty")]
    #[test_case("DEBUG" ; "uppercase")]
    #[test_case("warning" ; "unknown")]
    #[test_case("../../etc/passwd" ; "traversal")]
    #[test_case("logs/debug" ; "unix separator")]
    #[test_case("logs\\debug" ; "windows separator")]
    #[test_case("debug\0" ; "null byte")]
    fn rejected_names(name: &str) {
        assert!(matches!(
            name.parse::<LogCategory>(),
            Err(LogError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        for category in LogCategory::ALL {
            assert_eq!(category.to_string().parse::<LogCategory>().ok(), Some(category));
        }
    }

    #[test]
    fn only_levels_have_ordinals() {
        assert_eq!(LogCategory::Trace.level_ordinal(), Some(1));
        assert_eq!(LogCategory::Fatal.level_ordinal(), Some(6));
        assert_eq!(LogCategory::Httpd.level_ordinal(), None);
        assert!(LogCategory::Stdout.is_stream());
        assert!(!LogCategory::Httpd.is_stream());
    }

    proptest! {
        #[test]
        fn prop_separator_always_rejected(
            prefix in "[a-z.]{0,8}",
            sep in prop::sample::select(PATH_SEPARATORS.to_vec()),
            suffix in "[a-z.]{0,8}"
        ) {
            let name = format!("{prefix}{sep}{suffix}");
            prop_assert!(validate_category_name(&name).is_err());
        }
    }
}
