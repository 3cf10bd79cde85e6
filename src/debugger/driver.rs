use std::sync::mpsc::Sender;

use tracing::{debug, info, warn};

use crate::backend::BackendTransport;
use crate::debugger::breakpoints::{source_basename, Breakpoint, BreakpointRegistry};
use crate::debugger::queue::CommandQueue;
use crate::debugger::session::SessionState;
use crate::debugger::source::ContractSourceTracker;
use crate::debugger::stack::{StackFrame, StackReconstructor, VariableRecord};
use crate::error::DebugError;
use crate::events::{DebugEvent, SourceHighlighter};
use crate::protocol::{BackendMessage, BackendResponse, CodeLocation, Command};

/// Drives the backend through the command queue and folds its untagged
/// messages back into session state.
///
/// Correlation is strictly FIFO: exactly one command is in flight at a time,
/// the backend answers each command with one message, and the message's
/// declared type implies which command produced it. There are no request
/// IDs in the backend protocol; the single-in-flight discipline is the
/// invariant that keeps the interpretation in sync.
pub struct SessionDriver {
    queue: CommandQueue,
    breakpoints: BreakpointRegistry,
    tracker: ContractSourceTracker,
    stack: StackReconstructor,
    state: SessionState,
    backend: Box<dyn BackendTransport>,
    highlighter: Box<dyn SourceHighlighter>,
    events: Sender<DebugEvent>,
    in_flight: bool,
    terminated: bool,
}

impl SessionDriver {
    pub fn new(
        backend: Box<dyn BackendTransport>,
        highlighter: Box<dyn SourceHighlighter>,
        events: Sender<DebugEvent>,
    ) -> Self {
        Self {
            queue: CommandQueue::new(),
            breakpoints: BreakpointRegistry::new(),
            tracker: ContractSourceTracker::new(),
            stack: StackReconstructor::new(),
            state: SessionState::new(),
            backend,
            highlighter,
            events,
            in_flight: false,
            terminated: false,
        }
    }

    /// Begins the replay: announces readiness and takes the first step.
    pub fn start(&mut self) -> Result<(), DebugError> {
        self.emit(DebugEvent::Initialized);
        self.queue.step_sequence();
        self.dispatch_next()
    }

    pub fn step(&mut self) -> Result<(), DebugError> {
        if self.terminated {
            return Ok(());
        }
        self.queue.step_sequence();
        self.dispatch_next()
    }

    pub fn continue_(&mut self) -> Result<(), DebugError> {
        if self.terminated {
            return Ok(());
        }
        self.queue.continue_sequence();
        self.dispatch_next()
    }

    /// Registers a breakpoint and sends the backend a priority `break`
    /// command addressed by `<basename>:<line>`.
    pub fn set_breakpoint(&mut self, path: &str, line: usize) -> Result<Breakpoint, DebugError> {
        let bp = self.breakpoints.add(path, line);
        let locator = format!("{}:{}", source_basename(path), line);
        self.queue.enqueue_urgent(Command::SetBreakpoint(locator));
        self.dispatch_next()?;
        Ok(bp)
    }

    /// Function breakpoints go to the backend by bare name; they have no
    /// registry record and are never reported back as verified.
    pub fn set_function_breakpoint(&mut self, name: &str) -> Result<(), DebugError> {
        self.queue
            .enqueue_urgent(Command::SetBreakpoint(name.to_string()));
        self.dispatch_next()
    }

    /// Clears the oldest breakpoint registered for the file's basename.
    /// A clear with nothing registered is a benign no-op.
    pub fn clear_breakpoint(&mut self, path: &str) -> Result<Option<Breakpoint>, DebugError> {
        let Some(bp) = self.breakpoints.clear(path) else {
            return Ok(None);
        };
        let locator = format!("{}:{}", source_basename(&bp.source_path), bp.line);
        self.queue.enqueue_urgent(Command::ClearBreakpoint(locator));
        self.dispatch_next()?;
        Ok(Some(bp))
    }

    pub fn clear_all_breakpoints(&mut self, path: &str) {
        self.breakpoints.clear_all(path);
    }

    pub fn disconnect(&mut self) {
        self.highlighter.clear();
    }

    /// Folds one backend message into session state, then either transmits
    /// the next queued command or, when the queue has drained, raises the
    /// stop event for this cycle.
    pub fn process_message(&mut self, msg: BackendMessage) -> Result<(), DebugError> {
        if self.terminated {
            warn!("message received after session end, ignoring");
            return Ok(());
        }
        self.in_flight = false;

        let status_ok = msg.is_ok();
        match msg.response {
            BackendResponse::InfoLocals { variables } => {
                let locals = variables
                    .into_iter()
                    .map(|v| VariableRecord {
                        name: v.name,
                        ty: "string".to_string(),
                        value: v.value_string,
                    })
                    .collect();
                self.stack.set_pending_locals(locals);
            }
            BackendResponse::Backtrace { frames } => {
                let file = self.tracker.current_file().unwrap_or_default().to_string();
                let line = self.tracker.current_line();
                let interrupted =
                    self.state.exception_found() || self.state.breakpoint_hit();
                self.stack.apply_backtrace(&frames, &file, line, interrupted);
            }
            BackendResponse::Break { breakpoint_name } => {
                if status_ok {
                    self.verify_breakpoints(&breakpoint_name)?;
                }
            }
            BackendResponse::Revert { code } => {
                // Interrupt: this transaction is over. Any queued follow-ups
                // are invalid; capture final state instead.
                info!(line = code.line_index, "backend reported revert");
                if let Some(path) = &code.path {
                    self.tracker.set_source(path)?;
                }
                self.tracker.set_line(code.line_index);
                self.state.record_exception(code.text.clone());
                self.emit(DebugEvent::Output {
                    text: code.text.unwrap_or_default(),
                    file: code.path.unwrap_or_default(),
                    line: code.line_index,
                    column: code.line_pos,
                });
                self.queue.clear();
                self.queue.inspect_sequence();
            }
            BackendResponse::End => {
                info!("backend reported end of transaction");
                self.highlighter.clear();
                self.emit(DebugEvent::Terminated);
                self.terminated = true;
                return Ok(());
            }
            BackendResponse::Step { code } => {
                self.handle_location(status_ok, &code)?;
            }
            BackendResponse::Breakpoint { code } => {
                self.handle_location(status_ok, &code)?;
                self.state.mark_breakpoint_hit();
            }
        }

        self.after_message()
    }

    /// Step/breakpoint messages carry the new execution location; the
    /// tracker takes it as ground truth and the highlighter gets the
    /// `[start, end)` column range on that line.
    fn handle_location(
        &mut self,
        status_ok: bool,
        code: &CodeLocation,
    ) -> Result<(), DebugError> {
        if !status_ok {
            return Ok(());
        }
        if let Some(path) = &code.path {
            self.tracker.set_source(path)?;
            self.tracker.set_line(code.line_index);
            self.highlighter.highlight(
                code.line_pos,
                code.line_pos + code.line_length,
                code.line_index,
            );
        }
        Ok(())
    }

    fn after_message(&mut self) -> Result<(), DebugError> {
        if self.queue.is_empty() {
            // Exception outranks breakpoint-hit outranks plain step.
            if self.state.exception_found() {
                self.emit(DebugEvent::StopOnException);
            } else if self.state.take_breakpoint_hit() {
                self.emit(DebugEvent::StopOnBreakpoint);
            } else {
                self.emit(DebugEvent::StopOnStep);
            }
            Ok(())
        } else {
            self.dispatch_next()
        }
    }

    fn dispatch_next(&mut self) -> Result<(), DebugError> {
        if self.terminated || self.in_flight {
            return Ok(());
        }
        if let Some(command) = self.queue.dequeue() {
            debug!(command = command.wire_name(), "transmitting command");
            self.backend.send(&command).map_err(DebugError::Transport)?;
            self.in_flight = true;
        }
        Ok(())
    }

    fn verify_breakpoints(&mut self, basename: &str) -> Result<(), DebugError> {
        let Some(path) = self.breakpoints.first_path(basename) else {
            return Ok(());
        };
        self.tracker.set_source(&path)?;
        for bp in self.breakpoints.verify(basename, self.tracker.line_count()) {
            info!(id = bp.id, line = bp.line, "breakpoint verified");
            self.emit(DebugEvent::BreakpointValidated(bp));
        }
        Ok(())
    }

    fn emit(&self, event: DebugEvent) {
        // Delivery is deferred through the channel; a dropped receiver just
        // means nobody is listening anymore.
        let _ = self.events.send(event);
    }

    // ---- read-only facade ----

    pub fn stack(&self) -> &[StackFrame] {
        self.stack.frames()
    }

    /// Variables by scope id, `"local_<frame>"`; anything unparseable reads
    /// as frame 0.
    pub fn variables(&self, variable_id: &str) -> &[VariableRecord] {
        let frame = variable_id
            .rsplit('_')
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        self.stack.variables(frame)
    }

    pub fn last_exception(&self) -> Option<&str> {
        self.state.exception_message()
    }

    pub fn take_breakpoint_hit(&mut self) -> bool {
        self.state.take_breakpoint_hit()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn tracker(&self) -> &ContractSourceTracker {
        &self.tracker
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }
}
