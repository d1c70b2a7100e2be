//! Reading resolved log files.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use crate::error::{LogError, Result};

/// Reads a log file as text, one `\n`-terminated line per input line.
///
/// Line endings are normalised: a trailing `\r\n` becomes `\n`, and a final
/// line without a terminator gets one. Invalid UTF-8 is replaced lossily.
///
/// # Errors
///
/// Returns [`LogError::FileNotFound`] if the path does not exist,
/// [`LogError::FileNotReadable`] if it cannot be opened for reading or is a
/// directory, and [`LogError::Io`] for failures while reading.
pub fn read_log_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(LogError::FileNotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(LogError::FileNotReadable(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => LogError::FileNotReadable(path.to_path_buf()),
        ErrorKind::NotFound => LogError::FileNotFound(path.to_path_buf()),
        _ => LogError::Io(e),
    })?;

    let mut reader = BufReader::new(file);
    let mut content = String::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        content.push_str(&String::from_utf8_lossy(&line));
        content.push('\n');
    }

    Ok(content)
}
