#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use valet_core::{CheckError, Invoke, ProcessOutput};

/// Text the scripted findings were produced for.
pub const TEXT: &str = "Use vale very much.\nteh end";

pub const FINDINGS: &str = r#"{"stdin.md":[
    {"Check":"Vale.Terms","Line":1,"Severity":"error","Span":[5,8],"Match":"vale",
     "Message":"Use 'Vale' instead of 'vale'.","Link":"https://vale.sh/docs",
     "Action":{"Name":"replace","Params":["Vale"]}},
    {"Check":"Vale.Redundancy","Line":1,"Severity":"warning","Span":[10,13],"Match":"very",
     "Message":"Avoid 'very'.","Action":{"Name":"remove","Params":null}},
    {"Check":"Vale.Spelling","Line":2,"Severity":"error","Span":[1,3],"Match":"teh",
     "Message":"Did you really mean 'teh'?","Action":{"Name":"suggest","Params":["spellings"]}}
]}"#;

type Respond = Box<dyn Fn(&str) -> ProcessOutput + Send + Sync>;

/// Stands in for the Vale executable and counts how often it ran.
pub struct FakeVale {
    calls: AtomicUsize,
    delay: Duration,
    respond: Respond,
}

impl FakeVale {
    pub fn new(output: ProcessOutput) -> Arc<Self> {
        Self::scripted(Duration::ZERO, move |_| output.clone())
    }

    pub fn with_findings() -> Arc<Self> {
        Self::new(ProcessOutput::new(1, FINDINGS, ""))
    }

    /// Answers from the submitted text after `delay`.
    pub fn scripted(
        delay: Duration,
        respond: impl Fn(&str) -> ProcessOutput + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            respond: Box::new(respond),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Invoke for FakeVale {
    async fn invoke(
        &self,
        _program: &Path,
        _args: &[String],
        stdin: &str,
    ) -> Result<ProcessOutput, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok((self.respond)(stdin))
    }
}

/// Flags the first "teh" on line one, wherever it is.
pub fn flag_teh(stdin: &str) -> ProcessOutput {
    let Some(at) = stdin.find("teh") else {
        return ProcessOutput::new(0, "", "");
    };
    let start = stdin[..at].chars().count() + 1;
    let findings = format!(
        r#"{{"stdin.md":[{{"Check":"Vale.Spelling","Line":1,"Severity":"error","Span":[{},{}],"Match":"teh","Message":"Did you really mean 'teh'?","Action":{{"Name":"replace","Params":["the"]}}}}]}}"#,
        start,
        start + 2
    );
    ProcessOutput::new(1, findings, "")
}

/// Creates a workspace whose config points at an existing executable.
pub fn workspace(config: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vale-bin"), "").unwrap();
    std::fs::write(dir.path().join(".valet.json"), config).unwrap();
    dir
}

pub async fn send_msg<W: AsyncWriteExt + Unpin>(writer: &mut W, msg: &str) {
    let content = format!("Content-Length: {}\r\n\r\n{}", msg.len(), msg);
    writer.write_all(content.as_bytes()).await.unwrap();
    writer.flush().await.unwrap();
}

pub async fn recv_msg<R: AsyncReadExt + Unpin>(reader: &mut R) -> Option<String> {
    // Read headers until \r\n\r\n, then exactly Content-Length bytes of body
    let mut buffer = Vec::new();
    let mut content_length = 0;

    loop {
        let byte = reader.read_u8().await.ok()?;
        buffer.push(byte);
        if buffer.ends_with(b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buffer);
            for line in headers.lines() {
                if line.to_lowercase().starts_with("content-length:") {
                    let parts: Vec<&str> = line.split(':').collect();
                    if parts.len() == 2 {
                        content_length = parts[1].trim().parse().unwrap_or_else(|e| {
                            panic!("Failed to parse Content-Length: {e}, header: {line}")
                        });
                    }
                }
            }
            break;
        }
    }

    if content_length == 0 {
        return None;
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await.ok()?;

    Some(String::from_utf8(body).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recv_msg_success() {
        let payload = r#"{"jsonrpc":"2.0","method":"abc","params":{}}"#;
        let data = format!("Content-Length: {}\r\n\r\n{}", payload.len(), payload);
        let mut cursor = std::io::Cursor::new(data.into_bytes());

        let result = recv_msg(&mut cursor).await;
        assert_eq!(result.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_recv_msg_eof() {
        let mut cursor = std::io::Cursor::new(b"Content-Le".to_vec());
        assert_eq!(recv_msg(&mut cursor).await, None);
    }
}
