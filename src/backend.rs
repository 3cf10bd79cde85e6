use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand, Stdio};

use tracing::debug;

use crate::error::DebugError;
use crate::protocol::{BackendMessage, Command};

/// Write half of the backend link. One command goes out at a time; the next
/// is sent only after the previous one's message has been processed.
pub trait BackendTransport {
    fn send(&mut self, command: &Command) -> io::Result<()>;
}

/// Per-session configuration, passed in at construction. The core holds no
/// process-wide state.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory containing `solitude.yaml`.
    pub config_dir: PathBuf,
    /// Python interpreter used to launch the backend module.
    pub interpreter: PathBuf,
}

impl SessionConfig {
    pub fn new(config_dir: impl Into<PathBuf>, interpreter: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            interpreter: interpreter.into(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("solitude.yaml")
    }

    /// Arguments for replaying `tx_hash` under the debugger, JSON output.
    pub fn backend_args(&self, tx_hash: &str) -> Vec<String> {
        vec![
            "-m".to_string(),
            "solitude".to_string(),
            "--config".to_string(),
            self.config_file().to_string_lossy().into_owned(),
            "debug".to_string(),
            "--json".to_string(),
            tx_hash.to_string(),
        ]
    }
}

/// The spawned backend process, communicating over piped stdin/stdout with
/// newline-delimited JSON records in both directions.
pub struct BackendProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl BackendProcess {
    pub fn spawn(config: &SessionConfig, tx_hash: &str) -> io::Result<Self> {
        let mut child = ProcessCommand::new(&config.interpreter)
            .args(config.backend_args(tx_hash))
            .current_dir(&config.config_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "backend has no stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "backend has no stdout"))?;

        debug!(interpreter = %config.interpreter.display(), tx_hash, "backend spawned");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Splits into the command writer handed to the driver and the message
    /// reader kept by the caller's receive loop.
    pub fn split(self) -> (BackendWriter, BackendReader) {
        (
            BackendWriter {
                _child: self.child,
                stdin: self.stdin,
            },
            BackendReader {
                stdout: self.stdout,
            },
        )
    }
}

pub struct BackendWriter {
    _child: Child,
    stdin: ChildStdin,
}

impl BackendTransport for BackendWriter {
    fn send(&mut self, command: &Command) -> io::Result<()> {
        let json = serde_json::to_string(&command.to_wire())?;
        self.stdin.write_all(json.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()
    }
}

pub struct BackendReader {
    stdout: BufReader<ChildStdout>,
}

impl BackendReader {
    /// Blocks for the next backend record. `Ok(None)` on EOF (backend
    /// exited); blank lines are skipped.
    pub fn read_message(&mut self) -> Result<Option<BackendMessage>, DebugError> {
        loop {
            let mut line = String::new();
            let n = self
                .stdout
                .read_line(&mut line)
                .map_err(DebugError::Transport)?;
            if n == 0 {
                return Ok(None);
            }
            if line.trim().is_empty() {
                continue;
            }
            return BackendMessage::parse(line.trim()).map(Some);
        }
    }
}
