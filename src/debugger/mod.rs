mod breakpoints;
mod driver;
mod queue;
mod session;
mod source;
mod stack;

pub use breakpoints::{source_basename, Breakpoint, BreakpointRegistry};
pub use driver::SessionDriver;
pub use queue::CommandQueue;
pub use session::SessionState;
pub use source::ContractSourceTracker;
pub use stack::{StackFrame, StackReconstructor, VariableRecord};
