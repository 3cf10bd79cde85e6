use crate::debugger::Breakpoint;

/// Notifications the core raises toward the front-end protocol layer.
/// Delivered over a channel so a stop event is observed only after the
/// triggering call has returned; ordering between events is preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugEvent {
    Initialized,
    StopOnStep,
    StopOnBreakpoint,
    StopOnException,
    BreakpointValidated(Breakpoint),
    Output {
        text: String,
        file: String,
        line: usize,
        column: usize,
    },
    Terminated,
}

/// Cosmetic editor-highlighting collaborator. Receives a `[start, end)`
/// column range on the given line; purely decoration, never consulted back.
pub trait SourceHighlighter {
    fn highlight(&mut self, start_column: usize, end_column: usize, line: usize);
    fn clear(&mut self);
}

/// Highlighter that does nothing, for headless use.
pub struct NullHighlighter;

impl SourceHighlighter for NullHighlighter {
    fn highlight(&mut self, _start_column: usize, _end_column: usize, _line: usize) {}
    fn clear(&mut self) {}
}
