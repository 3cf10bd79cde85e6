pub mod backend;
pub mod debugger;
pub mod error;
pub mod events;
pub mod protocol;

pub use backend::{BackendProcess, BackendTransport, SessionConfig};
pub use debugger::{
    Breakpoint, BreakpointRegistry, CommandQueue, ContractSourceTracker, SessionDriver,
    SessionState, StackFrame, StackReconstructor, VariableRecord,
};
pub use error::DebugError;
pub use events::{DebugEvent, NullHighlighter, SourceHighlighter};
pub use protocol::{BackendMessage, BackendResponse, Command};
