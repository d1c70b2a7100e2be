//! The log retrieval task.
//!
//! A [`GetLogTask`] is created per request, executed either inline on the
//! local node or shipped to a remote node, and then read back by the caller.

use claw_logs::{
    read_log_file, CategoryResolution, LogCategoryResolver, DEFAULT_CATEGORY,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scheduling priority attached to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background work.
    Bulk,
    /// Ordinary cluster work.
    Normal,
    /// Interactive requests from an operator.
    Gui,
}

/// Serializable unit of work that reads one log category on a node.
///
/// `success == true` implies `log` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLogTask {
    /// Scheduling priority.
    pub priority: Priority,
    /// Requested category; `None` means the default category.
    pub name: Option<String>,
    /// Result content, set by execution.
    pub log: Option<String>,
    /// Whether execution completed.
    pub success: bool,
}

impl GetLogTask {
    /// Creates an interactive-priority task for a category.
    #[must_use]
    pub fn new(name: Option<String>) -> Self {
        Self {
            priority: Priority::Gui,
            name,
            log: None,
            success: false,
        }
    }

    /// The category this task will read, with the default applied.
    #[must_use]
    pub fn category_name(&self) -> &str {
        match self.name.as_deref() {
            None | Some(DEFAULT_CATEGORY) => "debug",
            Some(name) => name,
        }
    }

    /// Runs the task body against this node's logs.
    ///
    /// Unsupported streams complete successfully with an explanatory message
    /// as content.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error for invalid categories or missing
    /// configuration, and the reader's error if the file is missing or
    /// unreadable. On error the task is left unsuccessful.
    pub fn execute(&mut self, resolver: &LogCategoryResolver) -> claw_logs::Result<()> {
        let name = self.category_name().to_string();
        debug!(category = %name, priority = ?self.priority, "executing log task");

        let content = match resolver.resolve(&name)? {
            CategoryResolution::ResolvedPath(path) => read_log_file(&path)?,
            CategoryResolution::UnsupportedStream(message) => message,
        };

        self.name = Some(name);
        self.log = Some(content);
        self.success = true;
        Ok(())
    }
}
