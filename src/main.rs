use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::channel;

use tracing::error;
use tracing_subscriber::EnvFilter;

use contract_debugger::{
    BackendProcess, DebugEvent, NullHighlighter, SessionConfig, SessionDriver,
};

/// Headless replay driver: steps a transaction from start to finish,
/// printing each stop location and the final state. The real front end
/// (a DAP protocol layer) talks to `SessionDriver` the same way.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(config_dir), Some(tx_hash)) = (args.next(), args.next()) else {
        eprintln!("usage: contract-debugger <config-dir> <tx-hash> [interpreter]");
        return ExitCode::FAILURE;
    };
    let interpreter = args.next().unwrap_or_else(|| "python3".to_string());

    let config = SessionConfig::new(PathBuf::from(config_dir), PathBuf::from(interpreter));
    match replay(&config, &tx_hash) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("replay failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn replay(config: &SessionConfig, tx_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    let process = BackendProcess::spawn(config, tx_hash)?;
    let (writer, mut reader) = process.split();

    let (events_tx, events_rx) = channel();
    let mut driver = SessionDriver::new(Box::new(writer), Box::new(NullHighlighter), events_tx);
    driver.start()?;

    while let Some(msg) = reader.read_message()? {
        driver.process_message(msg)?;

        // A stop event means the queue drained and the session is waiting
        // for the next control command.
        let mut stopped = false;
        for event in events_rx.try_iter() {
            match event {
                DebugEvent::StopOnStep => {
                    stopped = true;
                    let file = driver.tracker().current_file().unwrap_or("<unknown>");
                    println!("step  {}:{}", file, driver.tracker().current_line());
                }
                DebugEvent::StopOnBreakpoint => {
                    stopped = true;
                    let file = driver.tracker().current_file().unwrap_or("<unknown>");
                    println!("break {}:{}", file, driver.tracker().current_line());
                }
                DebugEvent::StopOnException => {
                    stopped = true;
                    println!(
                        "revert: {}",
                        driver.last_exception().unwrap_or("<no message>")
                    );
                    for frame in driver.stack() {
                        println!("  #{} {} at {}:{}", frame.index, frame.name, frame.file, frame.line);
                    }
                    for var in driver.variables("local_0") {
                        println!("  {} = {}", var.name, var.value);
                    }
                }
                DebugEvent::Output { text, file, line, .. } => {
                    println!("output {}:{}: {}", file, line, text);
                }
                DebugEvent::Terminated => {
                    println!("transaction replay finished");
                    return Ok(());
                }
                DebugEvent::Initialized | DebugEvent::BreakpointValidated(_) => {}
            }
        }

        if driver.is_terminated() {
            break;
        }
        // Keep replaying until the backend reports the end of the
        // transaction.
        if stopped {
            driver.step()?;
        }
    }

    Ok(())
}
