use std::fs;

use tracing::debug;

use crate::error::DebugError;

/// Cache of the currently-loaded contract source. Content is reloaded only
/// when the reported path changes; the current line is the ground truth the
/// stack reconstructor patches into frame 0.
#[derive(Debug, Default)]
pub struct ContractSourceTracker {
    path: Option<String>,
    lines: Vec<String>,
    current_line: usize,
}

impl ContractSourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` if it differs from the current source. An unreadable
    /// path is surfaced, not swallowed: a silently missing source would
    /// break breakpoint verification and stack rendering downstream.
    pub fn set_source(&mut self, path: &str) -> Result<(), DebugError> {
        if self.path.as_deref() == Some(path) {
            return Ok(());
        }
        let contents = fs::read_to_string(path).map_err(|e| DebugError::SourceUnavailable {
            path: path.to_string(),
            source: e,
        })?;
        self.lines = contents.lines().map(str::to_string).collect();
        debug!(path, lines = self.lines.len(), "contract source loaded");
        self.path = Some(path.to_string());
        Ok(())
    }

    pub fn set_line(&mut self, line: usize) {
        self.current_line = line;
    }

    pub fn current_file(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }
}
