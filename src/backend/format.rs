//! 外部排版器：文本从 stdin 进、从 stdout 出，任何失败都是致命错误

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{GenError, GenResult};

pub fn run_formatter(command: &[String], text: &str) -> GenResult<String> {
    let Some((program, args)) = command.split_first() else {
        return Ok(text.to_string());
    };
    let shown = command.join(" ");
    let fail = |reason: String| GenError::Format { command: shown.clone(), reason };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| fail(e.to_string()))?;

    // 单独的线程写 stdin，避免双方管道缓冲都满时互相等待
    let mut stdin = child.stdin.take().ok_or_else(|| fail("stdin unavailable".into()))?;
    let input = text.to_string();
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child.wait_with_output().map_err(|e| fail(e.to_string()))?;
    let written = writer.join();

    // 排版器先退出时写端会断管，先报它自己的错误
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(fail(format!("{}: {}", output.status, stderr.trim())));
    }
    match written {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(fail(format!("writing input: {e}"))),
        Err(_) => return Err(fail("input writer panicked".into())),
    }
    let formatted = String::from_utf8(output.stdout).map_err(|e| fail(e.to_string()))?;
    tracing::debug!(command = %shown, bytes = formatted.len(), "formatted");
    Ok(formatted)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn output_replaces_input() {
        let out = run_formatter(&cmd(&["tr", "a-z", "A-Z"]), "fn x() {}\n").unwrap();
        assert_eq!(out, "FN X() {}\n");
    }

    #[test]
    fn empty_command_is_identity() {
        assert_eq!(run_formatter(&[], "keep").unwrap(), "keep");
    }

    #[test]
    fn failures_are_fatal() {
        let err = run_formatter(&cmd(&["sh", "-c", "echo bad input >&2; exit 3"]), "x").unwrap_err();
        assert!(matches!(&err, GenError::Format { reason, .. } if reason.contains("bad input")));
        assert!(run_formatter(&cmd(&["cblasgen-no-such-formatter"]), "x").is_err());
    }
}
