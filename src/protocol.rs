use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::DebugError;

/// A command for the debugging backend. Immutable once constructed; the
/// locator carried by the breakpoint variants is `"<basename>:<line>"` or a
/// bare function name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Step,
    Continue,
    InfoLocals,
    Backtrace,
    SetBreakpoint(String),
    ClearBreakpoint(String),
}

impl Command {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Command::Step => "step",
            Command::Continue => "continue",
            Command::InfoLocals => "info_locals",
            Command::Backtrace => "backtrace",
            Command::SetBreakpoint(_) => "break",
            Command::ClearBreakpoint(_) => "delete",
        }
    }

    /// Breakpoint set/clear jump the queue ahead of normal-flow commands.
    pub fn is_urgent(&self) -> bool {
        matches!(
            self,
            Command::SetBreakpoint(_) | Command::ClearBreakpoint(_)
        )
    }

    /// Record-delimited JSON as the backend expects it. Plain verbs carry an
    /// empty `args` string, breakpoint verbs a one-element locator array.
    pub fn to_wire(&self) -> Value {
        match self {
            Command::SetBreakpoint(locator) | Command::ClearBreakpoint(locator) => {
                json!({ "command": self.wire_name(), "args": [locator] })
            }
            _ => json!({ "command": self.wire_name(), "args": "" }),
        }
    }
}

/// One untagged backend message. The backend sends exactly one per
/// transmitted command plus out-of-band interrupts (`revert`, `end`); the
/// response `type` is the only correlation there is.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendMessage {
    pub status: String,
    pub response: BackendResponse,
}

impl BackendMessage {
    pub fn parse(line: &str) -> Result<Self, DebugError> {
        serde_json::from_str(line).map_err(|e| DebugError::BackendProtocol(e.to_string()))
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendResponse {
    InfoLocals { variables: Vec<RawVariable> },
    Backtrace { frames: Vec<RawFrame> },
    Break { breakpoint_name: String },
    Revert { code: CodeLocation },
    End,
    Step { code: CodeLocation },
    Breakpoint { code: CodeLocation },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVariable {
    pub name: String,
    pub value_string: String,
}

/// A frame as the backend reports it: index + static description + the
/// compilation-unit location. No enter/exit events, no historical positions.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFrame {
    pub index: usize,
    pub description: String,
    pub code: UnitLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitLocation {
    pub unitname: String,
    pub line_index: usize,
}

/// Source position attached to step/breakpoint/revert messages. The
/// `line_lenght` spelling is the backend's, kept on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeLocation {
    #[serde(default)]
    pub path: Option<String>,
    pub line_index: usize,
    pub line_pos: usize,
    #[serde(rename = "line_lenght")]
    pub line_length: usize,
    #[serde(default)]
    pub text: Option<String>,
}
