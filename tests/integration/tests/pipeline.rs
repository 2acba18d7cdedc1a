//! End-to-end tests of the check pipeline
//!
//! Drives configuration, executable resolution, process invocation, the
//! single-flight runner and the document session against a shell script
//! that stands in for Vale.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use valet_core::{CheckError, ValetConfig};
use valet_document::{LintSession, SpellingCache};

const FAKE_VALE: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$@" >> "$dir/calls.log"
input=$(cat)
printf '%s' "$input" > "$dir/stdin.txt"
if [ -f "$dir/slow" ]; then
  sleep 0.3
fi
case "$input" in
  *crash*)
    echo "engine exploded" >&2
    exit 2
    ;;
  *garbage*)
    echo "not json"
    exit 1
    ;;
  *vale*)
    printf '%s' '{"stdin.md":[{"Check":"Vale.Redundancy","Line":1,"Severity":"warning","Span":[7,10],"Match":"very","Message":"Avoid very.","Action":{"Name":"remove","Params":null}},{"Check":"Vale.Terms","Line":1,"Severity":"error","Span":[12,15],"Match":"vale","Message":"Use Vale.","Action":{"Name":"replace","Params":["Vale"]}}]}'
    exit 1
    ;;
esac
exit 0
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-vale");
        fs::write(&script, FAKE_VALE).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(dir.path().join(".valet.json"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> ValetConfig {
        let path = ValetConfig::discover(self.path()).unwrap();
        ValetConfig::from_file(path).unwrap()
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn last_stdin(&self) -> String {
        fs::read_to_string(self.path().join("stdin.txt")).unwrap()
    }
}

const CONFIG: &str = r#"{ "cli": { "valePath": "fake-vale" } }"#;

#[tokio::test]
async fn check_passes_text_and_format() {
    let ws = Workspace::new(CONFIG);
    let runner = ws.config().runner();

    let result = runner.run("It is very vale.\n", ".rst").await.unwrap();

    assert_eq!(result.total(), 2);
    assert_eq!(ws.calls(), vec!["--ext=.rst --output=JSON"]);
    assert_eq!(ws.last_stdin(), "It is very vale.\n");
}

#[tokio::test]
async fn explicit_vale_config_is_passed() {
    let ws = Workspace::new(
        r#"{ "cli": { "valePath": "fake-vale", "configPath": "styles/.vale.ini" } }"#,
    );
    fs::create_dir(ws.path().join("styles")).unwrap();
    fs::write(ws.path().join("styles/.vale.ini"), "StylesPath = .\n").unwrap();

    ws.config().runner().run("clean", ".md").await.unwrap();

    let expected = ws.path().join("styles/.vale.ini");
    assert_eq!(
        ws.calls(),
        vec![format!("--config={} --ext=.md --output=JSON", expected.display())]
    );
}

#[tokio::test]
async fn clean_exit_means_no_findings() {
    let ws = Workspace::new(CONFIG);
    let result = ws.config().runner().run("All good.", ".md").await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn crash_reports_stderr() {
    let ws = Workspace::new(CONFIG);
    let err = ws.config().runner().run("crash", ".md").await.unwrap_err();

    match err {
        CheckError::ProcessFailed { code, stderr } => {
            assert_eq!(code, Some(2));
            assert!(stderr.contains("engine exploded"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn malformed_output_is_a_parse_error() {
    let ws = Workspace::new(CONFIG);
    let err = ws.config().runner().run("garbage", ".md").await.unwrap_err();
    assert!(err.is_parse_error());
}

#[tokio::test]
async fn missing_executable_never_spawns() {
    let ws = Workspace::new(r#"{ "cli": { "valePath": "nowhere/vale" } }"#);
    let err = ws.config().runner().run("vale", ".md").await.unwrap_err();

    assert!(err.is_configuration_error());
    assert!(ws.calls().is_empty());
}

#[tokio::test]
async fn concurrent_checks_share_one_process() {
    let ws = Workspace::new(CONFIG);
    fs::write(ws.path().join("slow"), "").unwrap();
    let runner = ws.config().runner();

    let (a, b) = tokio::join!(
        runner.run("It is very vale.\n", ".md"),
        runner.run("something else", ".md"),
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(ws.calls().len(), 1);

    runner.run("again", ".md").await.unwrap();
    assert_eq!(ws.calls().len(), 2);
}

#[tokio::test]
async fn session_fixes_and_rechecks() {
    let ws = Workspace::new(CONFIG);
    let mut session = LintSession::new(
        "It is very vale.\n",
        ".md",
        ws.config().runner(),
        Arc::new(SpellingCache::default()),
    );

    session.refresh().await.unwrap();
    assert_eq!(
        session.summary().to_string(),
        "1 errors, 1 warnings, 0 suggestions"
    );

    let vale = session.query_hover(12).unwrap();
    assert!(session.apply_action(vale, None).await);
    assert_eq!(session.document().text(), "It is very Vale.\n");

    // Same-length replacement leaves the earlier finding in place.
    let very = session.query_hover(7).unwrap();
    assert_eq!(session.decorations().get(very).unwrap().range.from, 6);
    assert!(session.apply_action(very, None).await);
    assert_eq!(session.document().text(), "It is  Vale.\n");

    session.refresh().await.unwrap();
    assert!(session.decorations().is_empty());
    assert_eq!(ws.calls().len(), 2);
}
