//! Inspection of the process's standard output and error descriptors.
//!
//! stdout and stderr can only be served as log content when they are
//! redirected to a regular file. On Linux the target is read from
//! `/proc/self/fd/{1,2}`; consoles, sockets and pipes are reported as
//! unsupported.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::trace;

/// One of the process's standard output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdStream {
    /// Descriptor 1.
    Stdout,
    /// Descriptor 2.
    Stderr,
}

impl StdStream {
    /// The file descriptor number.
    #[must_use]
    pub const fn fd(&self) -> u32 {
        match self {
            Self::Stdout => 1,
            Self::Stderr => 2,
        }
    }
}

/// What a standard stream is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    /// A regular file at the given path.
    File(PathBuf),
    /// A terminal or other device under `/dev`.
    Console,
    /// A socket.
    Socket,
    /// A pipe, or a descriptor whose target could not be resolved.
    Pipe,
}

/// Classifies a descriptor target.
///
/// `fd_path` is the descriptor entry (e.g. `/proc/self/fd/1`) and `resolved`
/// is what it points at. A target equal to the entry itself means the link
/// could not be followed, which happens for anonymous pipes.
#[must_use]
pub fn classify_target(fd_path: &Path, resolved: &Path) -> StreamTarget {
    if resolved == fd_path {
        return StreamTarget::Pipe;
    }
    let text = resolved.to_string_lossy();
    if text.starts_with("/dev") {
        StreamTarget::Console
    } else if text.starts_with("socket") {
        StreamTarget::Socket
    } else if text.starts_with("pipe") {
        StreamTarget::Pipe
    } else {
        StreamTarget::File(resolved.to_path_buf())
    }
}

/// Access to the process's descriptor table.
pub trait DescriptorTable: Send + Sync + fmt::Debug {
    /// Returns what the stream is attached to, or `None` if this host has no
    /// POSIX descriptor table to inspect.
    fn inspect(&self, stream: StdStream) -> Option<StreamTarget>;
}

/// Descriptor table backed by `/proc/self/fd`.
#[derive(Debug, Clone)]
pub struct ProcFdTable {
    root: PathBuf,
}

impl ProcFdTable {
    /// Creates a table reading from `/proc/self/fd`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root("/proc/self/fd")
    }

    /// Creates a table reading from a different descriptor directory.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for ProcFdTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorTable for ProcFdTable {
    fn inspect(&self, stream: StdStream) -> Option<StreamTarget> {
        if !self.root.is_dir() {
            return None;
        }
        let fd_path = self.root.join(stream.fd().to_string());
        let resolved = std::fs::read_link(&fd_path).unwrap_or_else(|_| fd_path.clone());
        trace!(fd = %fd_path.display(), target = %resolved.display(), "resolved descriptor");
        Some(classify_target(&fd_path, &resolved))
    }
}

/// Descriptor table for hosts without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDescriptorTable;

impl DescriptorTable for NoDescriptorTable {
    fn inspect(&self, _stream: StdStream) -> Option<StreamTarget> {
        None
    }
}

/// The descriptor table appropriate for the current platform.
#[must_use]
pub fn platform_descriptor_table() -> std::sync::Arc<dyn DescriptorTable> {
    #[cfg(target_os = "linux")]
    {
        std::sync::Arc::new(ProcFdTable::new())
    }
    #[cfg(not(target_os = "linux"))]
    {
        std::sync::Arc::new(NoDescriptorTable)
    }
}
