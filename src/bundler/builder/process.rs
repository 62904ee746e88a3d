//! External compiler execution with streamed output.

use crate::bundler::error::{Error, Result};
use std::{process::Stdio, sync::Mutex};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
};

/// Runs `command`, logging every output line under `tool` as log target.
///
/// stdout and stderr are read concurrently and captured in arrival order.
///
/// # Returns
///
/// The captured output on success.
///
/// # Errors
///
/// - `CommandFailed` if the process cannot be spawned or awaited
/// - `CompilationFailed` with the captured output verbatim on a non-zero exit
pub async fn run_tool(tool: &str, mut command: Command) -> Result<String> {
    let command_line = format!("{:?}", command.as_std());
    log::debug!("Running {command_line}");

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|error| Error::CommandFailed {
            command: command_line.clone(),
            error,
        })?;

    let captured = Mutex::new(Vec::new());
    // Both streams must complete before we check exit status
    tokio::join!(
        stream_lines(tool, child.stdout.take(), &captured),
        stream_lines(tool, child.stderr.take(), &captured),
    );

    let status = child.wait().await.map_err(|error| Error::CommandFailed {
        command: command_line,
        error,
    })?;

    let output = captured
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .join("\n");

    if !status.success() {
        return Err(Error::CompilationFailed {
            tool: tool.to_string(),
            exit_code: status.code(),
            diagnostic: output,
        });
    }

    Ok(output)
}

async fn stream_lines<R: AsyncRead + Unpin>(
    tool: &str,
    stream: Option<R>,
    captured: &Mutex<Vec<String>>,
) {
    let Some(stream) = stream else {
        return;
    };

    // Read raw bytes so output in a legacy codepage is still drained to EOF
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                log::info!(target: tool, "{line}");
                if let Ok(mut captured) = captured.lock() {
                    captured.push(line.to_string());
                }
            }
            Err(e) => {
                log::warn!(target: tool, "Failed to read output: {e}");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        command
    }

    #[tokio::test]
    async fn captures_both_streams() {
        let output = run_tool("sh", sh("echo out; echo err >&2")).await.unwrap();
        assert!(output.contains("out"));
        assert!(output.contains("err"));
    }

    #[tokio::test]
    async fn non_zero_exit_relays_output_verbatim() {
        let err = run_tool("sh", sh("echo 'Error in script line 3' >&2; exit 3"))
            .await
            .unwrap_err();
        match err {
            Error::CompilationFailed {
                tool,
                exit_code,
                diagnostic,
            } => {
                assert_eq!(tool, "sh");
                assert_eq!(exit_code, Some(3));
                assert_eq!(diagnostic, "Error in script line 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn invalid_utf8_output_is_drained_and_relayed() {
        let script = r"printf 'caf\351 line\n'; i=0; while [ $i -lt 20000 ]; do echo filler; i=$((i+1)); done; echo LAST; exit 2";
        let err = run_tool("sh", sh(script)).await.unwrap_err();
        match err {
            Error::CompilationFailed {
                exit_code,
                diagnostic,
                ..
            } => {
                assert_eq!(exit_code, Some(2));
                assert!(diagnostic.starts_with("caf\u{FFFD} line"));
                assert!(diagnostic.ends_with("LAST"));
                assert_eq!(diagnostic.lines().count(), 20002);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_command_failed() {
        let err = run_tool("nope", Command::new("msi-creator-definitely-missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }
}
