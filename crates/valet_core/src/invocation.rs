//! Running the Vale executable over standard input.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::{CheckError, FindingsByFile};

/// Captured result of one process run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Everything written to standard output.
    pub stdout: String,
    /// Everything written to standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Creates an output with the given exit code and streams.
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Spawns a program, feeds it `stdin` and collects its output.
#[async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(
        &self,
        program: &Path,
        args: &[String],
        stdin: &str,
    ) -> Result<ProcessOutput, CheckError>;
}

/// [`Invoke`] implementation backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

#[async_trait]
impl Invoke for ProcessInvoker {
    async fn invoke(
        &self,
        program: &Path,
        args: &[String],
        stdin: &str,
    ) -> Result<ProcessOutput, CheckError> {
        debug!("Spawning {} {:?}", program.display(), args);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CheckError::Spawn {
                path: program.to_path_buf(),
                source: Arc::new(e),
            })?;

        let input = child.stdin.take();
        let writer = async move {
            if let Some(mut input) = input {
                input.write_all(stdin.as_bytes()).await?;
                // Closing stdin signals end of input.
                input.shutdown().await?;
            }
            Ok::<(), io::Error>(())
        };

        let (written, output) = tokio::join!(writer, child.wait_with_output());
        let output = output?;

        if let Err(e) = written {
            // The engine may exit before reading everything, e.g. on a config
            // error. Its exit code and stderr explain more than EPIPE does.
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(e.into());
            }
            debug!("Vale closed stdin early: {}", e);
        }

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!("Vale exited with {:?}", result.exit_code);

        Ok(result)
    }
}

/// Builds Vale's command line.
///
/// The config flag is omitted entirely when no config path is set so that
/// Vale runs its own config discovery.
pub fn build_args(config_path: Option<&Path>, format: &str) -> Vec<String> {
    let mut args = Vec::with_capacity(3);
    if let Some(config) = config_path {
        args.push(format!("--config={}", config.display()));
    }
    args.push(format!("--ext={}", format));
    args.push("--output=JSON".to_string());
    args
}

/// Interprets Vale's exit code.
///
/// - `0`: ran successfully with no findings.
/// - `1`: ran successfully; stdout holds the findings.
/// - anything else: failure, stderr explains why.
pub fn interpret_output(output: &ProcessOutput) -> Result<FindingsByFile, CheckError> {
    match output.exit_code {
        Some(0) => Ok(FindingsByFile::new()),
        Some(1) => Ok(serde_json::from_str(&output.stdout)?),
        code => Err(CheckError::ProcessFailed {
            code,
            stderr: output.stderr.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FINDINGS: &str = r#"{"stdin.md":[{"Action":{"Name":"remove","Params":null},"Check":"Vale.Redundancy","Description":"","Line":1,"Link":"","Message":"Avoid redundancy","Severity":"warning","Span":[1,4],"Match":"very"}]}"#;

    #[test]
    fn test_build_args_without_config() {
        assert_eq!(build_args(None, ".md"), vec!["--ext=.md", "--output=JSON"]);
    }

    #[test]
    fn test_build_args_with_config() {
        let args = build_args(Some(Path::new("/vault/.vale.ini")), ".md");
        assert_eq!(
            args,
            vec!["--config=/vault/.vale.ini", "--ext=.md", "--output=JSON"]
        );
    }

    #[test]
    fn test_exit_zero_is_empty() {
        let result = interpret_output(&ProcessOutput::new(0, "", "")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_exit_one_parses_stdout() {
        let result = interpret_output(&ProcessOutput::new(1, FINDINGS, "")).unwrap();
        assert_eq!(result.total(), 1);
        assert_eq!(result.first_file_findings()[0].r#match, "very");
    }

    #[test]
    fn test_exit_one_with_garbage_is_parse_error() {
        let err = interpret_output(&ProcessOutput::new(1, "not json", "")).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_exit_two_carries_stderr() {
        let err = interpret_output(&ProcessOutput::new(2, "", "E201 Invalid value")).unwrap_err();
        match err {
            CheckError::ProcessFailed { code, stderr } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "E201 Invalid value");
            }
            other => panic!("Expected ProcessFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_signal_is_failure() {
        let output = ProcessOutput {
            exit_code: None,
            ..Default::default()
        };
        assert!(interpret_output(&output).unwrap_err().is_process_error());
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let err = ProcessInvoker
            .invoke(Path::new("/definitely/not/vale"), &[], "text")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use pretty_assertions::assert_eq;

        async fn run_script(script: &str, args: &[&str], stdin: &str) -> ProcessOutput {
            let mut full_args = vec!["-c".to_string(), script.to_string(), "vale".to_string()];
            full_args.extend(args.iter().map(|a| a.to_string()));
            ProcessInvoker
                .invoke(Path::new("/bin/sh"), &full_args, stdin)
                .await
                .unwrap()
        }

        #[tokio::test]
        async fn test_stdin_is_streamed_and_closed() {
            let output = run_script("cat", &[], "Hello, world.\nSecond line.").await;
            assert_eq!(output.exit_code, Some(0));
            assert_eq!(output.stdout, "Hello, world.\nSecond line.");
        }

        #[tokio::test]
        async fn test_collects_stderr_and_exit_code() {
            let output = run_script("cat > /dev/null; echo \"$@\" >&2; exit 2", &["--ext=.md"], "")
                .await;
            assert_eq!(output.exit_code, Some(2));
            assert_eq!(output.stderr.trim(), "--ext=.md");
        }

        #[tokio::test]
        async fn test_early_exit_does_not_mask_failure() {
            let large = "word ".repeat(200_000);
            let output = run_script("echo 'E100 boom' >&2; exit 2", &[], &large).await;
            let err = interpret_output(&output).unwrap_err();
            assert!(err.to_string().contains("E100 boom"));
        }

        #[tokio::test]
        async fn test_findings_round_trip_through_process() {
            let script = format!("cat > /dev/null; printf '%s' '{}'; exit 1", FINDINGS);
            let output = run_script(&script, &[], "very good").await;
            let result = interpret_output(&output).unwrap();
            assert_eq!(result.first_file_findings()[0].check, "Vale.Redundancy");
        }
    }
}
