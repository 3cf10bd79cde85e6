/// Transient stop-reason state, mutated only by the driver in response to
/// backend messages and read by the protocol layer to pick a stop event.
#[derive(Debug, Default)]
pub struct SessionState {
    exception_found: bool,
    exception_message: Option<String>,
    breakpoint_hit: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_exception(&mut self, message: Option<String>) {
        self.exception_found = true;
        self.exception_message = message;
    }

    /// Stays set once an exception is seen; the transaction is over.
    pub fn exception_found(&self) -> bool {
        self.exception_found
    }

    pub fn exception_message(&self) -> Option<&str> {
        self.exception_message.as_deref()
    }

    pub fn mark_breakpoint_hit(&mut self) {
        self.breakpoint_hit = true;
    }

    pub fn breakpoint_hit(&self) -> bool {
        self.breakpoint_hit
    }

    /// Edge-triggered: consuming the flag resets it, so it must not be
    /// re-read to mean "still stopped at breakpoint".
    pub fn take_breakpoint_hit(&mut self) -> bool {
        std::mem::take(&mut self.breakpoint_hit)
    }
}
