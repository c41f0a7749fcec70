use crate::command::{Captured, Execution, ExitCode};
use crate::errors::ExecError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, ExitStatus, Stdio};

/// Run `program` with `args`, stderr merged into stdout, and wait for it.
///
/// Without an `output_file` the merged stream is captured line by line. With one,
/// the file is created (or truncated) and receives the stream instead.
/// The child never shares the shell's stdin.
pub(crate) fn run(
    program: &str,
    args: &[String],
    output_file: Option<&Path>,
) -> Result<Execution, ExecError> {
    match output_file {
        Some(path) => run_redirected(program, args, path),
        None => run_captured(program, args),
    }
}

fn run_captured(program: &str, args: &[String]) -> Result<Execution, ExecError> {
    let capture_err = |source: io::Error| ExecError::Capture {
        program: program.to_string(),
        source,
    };

    let (reader, writer) = io::pipe().map_err(capture_err)?;
    let stderr = writer.try_clone().map_err(capture_err)?;
    // The builder owning our copies of the write end is dropped inside `spawn`,
    // so the reader sees EOF once the child exits.
    let mut child = spawn(program, args, writer.into(), stderr.into())?;

    let (text, status) = collect(&mut child, reader).map_err(capture_err)?;

    Ok(Execution {
        exit_code: exit_code(status),
        output: Captured::Text(text),
    })
}

fn run_redirected(program: &str, args: &[String], path: &Path) -> Result<Execution, ExecError> {
    let redirect_err = |source: io::Error| ExecError::Redirect {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(redirect_err)?;
    let stderr = file.try_clone().map_err(redirect_err)?;
    let mut child = spawn(program, args, file.into(), stderr.into())?;
    let status = child.wait().map_err(|source| ExecError::Capture {
        program: program.to_string(),
        source,
    })?;

    Ok(Execution {
        exit_code: exit_code(status),
        output: Captured::Redirected(path.to_path_buf()),
    })
}

fn spawn(program: &str, args: &[String], stdout: Stdio, stderr: Stdio) -> Result<Child, ExecError> {
    log::debug!("spawning {program} {args:?}");
    std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
        .map_err(|e| ExecError::from_spawn(program, e))
}

/// Drain `reader`, then wait for `child`.
///
/// Draining comes first: a child filling the pipe would otherwise block forever.
/// The child is reaped even when reading fails.
fn collect(child: &mut Child, reader: impl Read) -> io::Result<(String, ExitStatus)> {
    let text = match read_lines(reader) {
        Ok(text) => text,
        Err(e) => {
            let _ = child.wait();
            return Err(e);
        }
    };
    let status = child.wait()?;
    Ok((text, status))
}

/// Read the whole stream, terminating every line (the last one included) with `\n`.
///
/// `\r\n` endings are normalised and invalid UTF-8 is replaced.
fn read_lines(reader: impl Read) -> io::Result<String> {
    let mut reader = BufReader::new(reader);
    let mut text = String::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        text.push_str(&String::from_utf8_lossy(&line));
        text.push('\n');
    }

    Ok(text)
}

/// Map a finished child's status to an [`ExitCode`], `128 + signal` for killed children.
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> ExitCode {
    status.code().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    fn captured_text(execution: &Execution) -> &str {
        match &execution.output {
            Captured::Text(text) => text,
            Captured::Redirected(path) => panic!("unexpected redirect to {}", path.display()),
        }
    }

    #[test]
    fn test_read_lines_terminates_every_line() {
        assert_eq!(read_lines(Cursor::new("a\nb")).unwrap(), "a\nb\n");
        assert_eq!(read_lines(Cursor::new("a\r\nb\n")).unwrap(), "a\nb\n");
        assert_eq!(read_lines(Cursor::new("\n")).unwrap(), "\n");
        assert_eq!(read_lines(Cursor::new("")).unwrap(), "");
    }

    #[test]
    fn test_read_lines_replaces_invalid_utf8() {
        let text = read_lines(Cursor::new(vec![b'o', b'k', 0xff, b'\n'])).unwrap();
        assert_eq!(text, "ok\u{fffd}\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_stderr_is_merged_into_capture() {
        let execution = run("sh", &sh("echo out; echo err 1>&2; exit 3"), None).unwrap();
        assert_eq!(execution.exit_code, 3);
        assert_eq!(captured_text(&execution), "out\nerr\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_large_output_does_not_block() {
        let script = "i=0; while [ $i -lt 20000 ]; do echo line$i; i=$((i+1)); done";
        let execution = run("sh", &sh(script), None).unwrap();
        assert_eq!(execution.exit_code, 0);
        assert_eq!(captured_text(&execution).lines().count(), 20000);
    }

    #[test]
    #[cfg(unix)]
    fn test_child_does_not_read_shell_stdin() {
        let execution = run("cat", &[], None).unwrap();
        assert_eq!(execution.exit_code, 0);
        assert_eq!(captured_text(&execution), "");
    }

    #[test]
    #[cfg(unix)]
    fn test_killed_child_reports_signal_code() {
        let execution = run("sh", &sh("kill -9 $$"), None).unwrap();
        assert_eq!(execution.exit_code, 128 + 9);
    }

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_child_is_reaped_when_reading_fails() {
        let mut child = std::process::Command::new("sh")
            .args(sh("sleep 0.3"))
            .stdin(Stdio::null())
            .spawn()
            .unwrap();

        let err = collect(&mut child, BrokenPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        // The sleeping child only has a status this early if `collect` waited for it.
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    #[cfg(unix)]
    fn test_collect_reads_then_waits() {
        let mut child = std::process::Command::new("sh")
            .args(sh("exit 4"))
            .stdin(Stdio::null())
            .spawn()
            .unwrap();

        let (text, status) = collect(&mut child, Cursor::new("x\ny")).unwrap();
        assert_eq!(text, "x\ny\n");
        assert_eq!(exit_code(status), 4);
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let err = run("definitely-not-a-real-program-4821", &[], None).unwrap_err();
        assert!(matches!(err, ExecError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    #[cfg(unix)]
    fn test_redirect_writes_merged_stream_to_file() {
        let path =
            std::env::temp_dir().join(format!("external_tests_{}_redirect", std::process::id()));
        let _ = fs::remove_file(&path);

        let execution = run("sh", &sh("echo out; echo err 1>&2"), Some(path.as_path())).unwrap();
        assert_eq!(execution.exit_code, 0);
        assert!(matches!(execution.output, Captured::Redirected(ref p) if p == &path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "out\nerr\n");

        let _ = fs::remove_file(path);
    }

    #[test]
    #[cfg(unix)]
    fn test_unwritable_redirect_target() {
        let path = Path::new("/definitely/not/a/dir/out.txt");
        let err = run("true", &[], Some(path)).unwrap_err();
        assert!(matches!(err, ExecError::Redirect { .. }), "got {err:?}");
    }
}
