use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

/// A registered breakpoint. `verified` flips only once the backend has
/// acknowledged the file and the line is within the loaded source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub id: u64,
    pub source_path: String,
    pub line: usize,
    pub verified: bool,
}

/// The backend addresses breakpoints by compilation-unit name, not full
/// path, so registration buckets collapse to one per basename: two distinct
/// full paths sharing a basename share one bucket. That is a backend
/// constraint to preserve, not a bug to fix.
#[derive(Debug, Default)]
pub struct BreakpointRegistry {
    buckets: HashMap<String, Vec<Breakpoint>>,
    next_id: u64,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers an unverified breakpoint and returns a copy of the record.
    pub fn add(&mut self, path: &str, line: usize) -> Breakpoint {
        let bp = Breakpoint {
            id: self.next_id,
            source_path: path.to_string(),
            line,
            verified: false,
        };
        self.next_id += 1;

        let name = source_basename(path);
        debug!(id = bp.id, bucket = %name, line, "breakpoint registered");
        self.buckets.entry(name).or_default().push(bp.clone());
        bp
    }

    /// Removes and returns the oldest breakpoint in the path's bucket,
    /// regardless of which line it was set on. Single-slot-per-file clearing
    /// is the backend API's shape; a clear on an empty bucket is a no-op.
    pub fn clear(&mut self, path: &str) -> Option<Breakpoint> {
        let name = source_basename(path);
        let bucket = self.buckets.get_mut(&name)?;
        if bucket.is_empty() {
            return None;
        }
        let bp = bucket.remove(0);
        debug!(id = bp.id, bucket = %name, "breakpoint cleared");
        Some(bp)
    }

    /// Drops every breakpoint registered for the path's basename.
    pub fn clear_all(&mut self, path: &str) {
        self.buckets.remove(&source_basename(path));
    }

    /// Marks unverified breakpoints in the acked bucket verified when their
    /// line falls inside the loaded source, and returns the newly-verified
    /// records for event emission. Lines at or beyond `max_line` stay
    /// unverified forever; there is no retry.
    pub fn verify(&mut self, basename: &str, max_line: usize) -> Vec<Breakpoint> {
        let mut newly_verified = Vec::new();
        if let Some(bucket) = self.buckets.get_mut(basename) {
            for bp in bucket.iter_mut() {
                if !bp.verified && bp.line < max_line {
                    bp.verified = true;
                    newly_verified.push(bp.clone());
                }
            }
        }
        newly_verified
    }

    /// Full path of the first breakpoint registered under `basename`, used
    /// to locate the source the backend acknowledged.
    pub fn first_path(&self, basename: &str) -> Option<String> {
        self.buckets
            .get(basename)?
            .first()
            .map(|bp| bp.source_path.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}

/// The backend's name for a source file: the final path component.
pub fn source_basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}
