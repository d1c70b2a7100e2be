//! Category name to log source resolution.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::category::LogCategory;
use crate::descriptor::{platform_descriptor_table, DescriptorTable, StdStream, StreamTarget};
use crate::directory::LogDirectory;
use crate::error::{LogError, Result};

/// Message returned for stdout/stderr on hosts without a descriptor table.
pub const LINUX_ONLY_MESSAGE: &str = "This option only works for Linux hosts";

/// Message returned when a stream is attached to a console.
pub const CONSOLE_MESSAGE: &str = "Unsupported when writing to console";

/// Message returned when a stream is attached to a socket.
pub const SOCKET_MESSAGE: &str = "Unsupported when writing to a socket";

/// Message returned when a stream is attached to a pipe.
pub const PIPE_MESSAGE: &str = "Unsupported when writing to a pipe";

/// Where a category's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryResolution {
    /// Content is read from this file.
    ResolvedPath(PathBuf),
    /// The category cannot be served as a file; the message says why.
    ///
    /// This is an informative answer, not a failure.
    UnsupportedStream(String),
}

/// Resolves category names against a node's log directory and descriptor table.
#[derive(Debug, Clone)]
pub struct LogCategoryResolver {
    directory: Option<LogDirectory>,
    descriptors: Arc<dyn DescriptorTable>,
}

impl LogCategoryResolver {
    /// Creates a resolver using the platform descriptor table.
    ///
    /// `directory` is `None` when logging is not configured on this node.
    #[must_use]
    pub fn new(directory: Option<LogDirectory>) -> Self {
        Self {
            directory,
            descriptors: platform_descriptor_table(),
        }
    }

    /// Replaces the descriptor table.
    #[must_use]
    pub fn with_descriptor_table(mut self, descriptors: Arc<dyn DescriptorTable>) -> Self {
        self.descriptors = descriptors;
        self
    }

    /// The configured log directory, if any.
    #[must_use]
    pub fn directory(&self) -> Option<&LogDirectory> {
        self.directory.as_ref()
    }

    /// Resolves a raw category name.
    ///
    /// The name is validated before anything on disk is touched.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidCategory`] for unknown names or names with a
    /// path separator, and [`LogError::LoggingNotConfigured`] when a file
    /// category is requested but no log directory is configured.
    pub fn resolve(&self, name: &str) -> Result<CategoryResolution> {
        let category: LogCategory = name.parse()?;
        self.resolve_category(category)
    }

    /// Resolves an already-parsed category.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::LoggingNotConfigured`] when a file category is
    /// requested but no log directory is configured.
    pub fn resolve_category(&self, category: LogCategory) -> Result<CategoryResolution> {
        let resolution = match category {
            LogCategory::Stdout => self.resolve_stream(StdStream::Stdout),
            LogCategory::Stderr => self.resolve_stream(StdStream::Stderr),
            _ => {
                let directory = self.directory.as_ref().ok_or(LogError::LoggingNotConfigured)?;
                let path = directory
                    .path_for(category)
                    .ok_or_else(|| LogError::invalid_category(category.as_str(), "no log file"))?;
                CategoryResolution::ResolvedPath(path)
            }
        };

        debug!(category = %category, resolution = ?resolution, "resolved log category");
        Ok(resolution)
    }

    fn resolve_stream(&self, stream: StdStream) -> CategoryResolution {
        let unsupported = |msg: &str| CategoryResolution::UnsupportedStream(msg.to_string());
        match self.descriptors.inspect(stream) {
            None => unsupported(LINUX_ONLY_MESSAGE),
            Some(StreamTarget::Console) => unsupported(CONSOLE_MESSAGE),
            Some(StreamTarget::Socket) => unsupported(SOCKET_MESSAGE),
            Some(StreamTarget::Pipe) => unsupported(PIPE_MESSAGE),
            Some(StreamTarget::File(path)) => CategoryResolution::ResolvedPath(path),
        }
    }
}
