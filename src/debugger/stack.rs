use tracing::debug;

use crate::protocol::RawFrame;

/// One reconstructed call-stack entry, index 0 innermost. `variables_stale`
/// marks frames backfilled during an interrupt: their location is the
/// interrupt site and their variable snapshot is a clone of whatever was
/// current at backfill time, not ground truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub index: String,
    pub name: String,
    pub file: String,
    pub line: usize,
    pub variables_stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRecord {
    pub name: String,
    pub ty: String,
    pub value: String,
}

/// Rebuilds the call stack from a backend that only ever reports "how many
/// frames exist now" plus a static description per frame. Enter/exit is
/// inferred from the count delta; the one piece of ground truth available
/// (the tracker's current file/line) is patched in wherever it is knowable.
///
/// One variable row is kept per frame; `pending` holds the latest
/// `info_locals` result, the frame-0 candidate, until the next backtrace
/// attaches it.
#[derive(Debug, Default)]
pub struct StackReconstructor {
    frames: Vec<StackFrame>,
    variable_rows: Vec<Vec<VariableRecord>>,
    pending: Vec<VariableRecord>,
}

impl StackReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Variables for a frame. Frame 0 reads the live pending list; deeper
    /// frames read the snapshot captured when the frame was inserted.
    pub fn variables(&self, frame: usize) -> &[VariableRecord] {
        if frame == 0 {
            &self.pending
        } else {
            self.variable_rows
                .get(frame)
                .map(Vec::as_slice)
                .unwrap_or(&[])
        }
    }

    pub fn set_pending_locals(&mut self, locals: Vec<VariableRecord>) {
        self.pending = locals;
    }

    pub fn pending_locals(&self) -> &[VariableRecord] {
        &self.pending
    }

    /// Applies one `backtrace` response. `file`/`line` are the tracker's
    /// current location; `interrupted` is set when a breakpoint hit or an
    /// exception is pending, which switches growth handling to the
    /// truncate-and-backfill path.
    pub fn apply_backtrace(
        &mut self,
        reported: &[RawFrame],
        file: &str,
        line: usize,
        interrupted: bool,
    ) {
        let reported_len = reported.len();
        let local_len = self.frames.len();

        if reported_len > local_len {
            self.grow(reported, file, line, interrupted);
        } else if reported_len < local_len {
            // A return: the innermost frame and its snapshot are gone.
            self.frames.remove(0);
            self.variable_rows.remove(0);
        }

        // Keep the innermost frame live even on a plain statement step.
        if let Some(first) = self.frames.first_mut() {
            first.file = file.to_string();
            first.line = line;
        }

        debug!(
            reported = reported_len,
            local = self.frames.len(),
            interrupted,
            "backtrace applied"
        );
    }

    fn grow(&mut self, reported: &[RawFrame], file: &str, line: usize, interrupted: bool) {
        let reported_len = reported.len();
        let local_len = self.frames.len();

        // A call was entered: every existing frame shifts outward.
        for (position, frame) in self.frames.iter_mut().enumerate() {
            frame.index = (position + 1).to_string();
        }

        // The outermost local frame was a placeholder for "caller"; its
        // location is only now resolved.
        if local_len >= 2 {
            if let Some(last) = self.frames.last_mut() {
                last.file = file.to_string();
                last.line = line;
            }
        }

        if interrupted {
            // The backend jumped several frames at once (breakpoint or
            // exception unwind). Historical per-frame positions are not
            // available, so keep the two most-recent frames, relabel them to
            // the top reported indices, and approximate every intermediate
            // frame at the interrupt site with a cloned snapshot.
            self.frames.truncate(2);
            self.variable_rows.truncate(2);
            let kept = self.frames.len();
            for (position, frame) in self.frames.iter_mut().enumerate() {
                frame.index = (reported_len - kept + position).to_string();
            }
            for index in (1..reported_len.saturating_sub(kept)).rev() {
                self.frames.insert(
                    0,
                    StackFrame {
                        index: index.to_string(),
                        name: description_for(reported, index),
                        file: file.to_string(),
                        line,
                        variables_stale: true,
                    },
                );
                self.variable_rows.insert(0, self.pending.clone());
            }
        } else if reported_len > local_len + 1 {
            // Frames the backend reported that we never saw enter. Their own
            // unit/line report is authoritative here, but no locals were
            // ever captured for them.
            for index in (local_len + 1)..reported_len {
                let (name, frame_file, frame_line) = match raw_frame(reported, index) {
                    Some(raw) => (
                        raw.description.clone(),
                        raw.code.unitname.clone(),
                        raw.code.line_index,
                    ),
                    None => (format!("frame_{}", index), file.to_string(), line),
                };
                self.frames.push(StackFrame {
                    index: index.to_string(),
                    name,
                    file: frame_file,
                    line: frame_line,
                    variables_stale: false,
                });
                self.variable_rows.push(Vec::new());
            }
        }

        // The new innermost frame, with a fresh snapshot of the pending
        // locals.
        self.frames.insert(
            0,
            StackFrame {
                index: "0".to_string(),
                name: description_for(reported, 0),
                file: file.to_string(),
                line,
                variables_stale: false,
            },
        );
        self.variable_rows.insert(0, self.pending.clone());
    }
}

fn raw_frame(reported: &[RawFrame], index: usize) -> Option<&RawFrame> {
    reported.iter().find(|f| f.index == index)
}

fn description_for(reported: &[RawFrame], index: usize) -> String {
    raw_frame(reported, index)
        .map(|f| f.description.clone())
        .unwrap_or_else(|| format!("frame_{}", index))
}
