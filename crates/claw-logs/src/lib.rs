//! # claw-logs
//!
//! Log category resolution and log file access for Clawbernetes nodes.
//!
//! This crate provides:
//!
//! - [`LogCategory`]: The log categories a node can serve
//! - [`LogDirectory`]: Where log files live and how they are named
//! - [`LogCategoryResolver`]: Maps a category name to a file or an
//!   unsupported-stream explanation
//! - [`DescriptorTable`]: Inspection of stdout/stderr redirection
//! - [`read_log_file`]: Reads a resolved log file as text
//!
//! ## Example
//!
//! ```rust
//! use claw_logs::{CategoryResolution, LogCategoryResolver, LogDirectory};
//! use std::path::PathBuf;
//!
//! let resolver = LogCategoryResolver::new(Some(LogDirectory::new("/var/log/claw")));
//!
//! // "default" is an alias for the debug log.
//! let resolution = resolver.resolve("default")?;
//! assert_eq!(
//!     resolution,
//!     CategoryResolution::ResolvedPath(PathBuf::from("/var/log/claw/claw-2-debug.log"))
//! );
//!
//! // Path separators are rejected before touching the filesystem.
//! assert!(resolver.resolve("../../etc/passwd").is_err());
//! # Ok::<(), claw_logs::LogError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod category;
pub mod descriptor;
pub mod directory;
pub mod error;
pub mod reader;
pub mod resolver;

pub use category::{validate_category_name, LogCategory, DEFAULT_CATEGORY, PATH_SEPARATORS};
pub use descriptor::{
    classify_target, platform_descriptor_table, DescriptorTable, NoDescriptorTable, ProcFdTable,
    StdStream, StreamTarget,
};
pub use directory::{LogDirectory, DEFAULT_FILE_PREFIX};
pub use error::{LogError, Result};
pub use reader::read_log_file;
pub use resolver::{
    CategoryResolution, LogCategoryResolver, CONSOLE_MESSAGE, LINUX_ONLY_MESSAGE, PIPE_MESSAGE,
    SOCKET_MESSAGE,
};
