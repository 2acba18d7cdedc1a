//! Finding types mirroring Vale's JSON output.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Severity level of a finding.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    Error,
    /// Warning - should be reviewed.
    Warning,
    /// Suggestion - lowest urgency.
    #[default]
    Suggestion,
}

impl Severity {
    /// Parses a severity case-insensitively.
    ///
    /// Unrecognized values fall back to [`Severity::Suggestion`].
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Suggestion,
        }
    }

    /// Returns the lowercase name of the severity.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A machine-readable fix instruction attached to a finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindingAction {
    /// Action name (`remove`, `replace`, `suggest`, `edit`).
    #[serde(rename = "Name", default)]
    pub name: String,

    /// Action parameters. Vale emits `null` when there are none.
    #[serde(rename = "Params", default, deserialize_with = "null_as_empty")]
    pub params: Vec<String>,
}

impl FindingAction {
    /// Creates a new action.
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the action carries no instruction.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One issue reported by Vale.
///
/// `line` and `span` are only meaningful against the exact text that was
/// submitted for the check that produced the finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Finding {
    /// Fix instruction, if any.
    #[serde(default, deserialize_with = "empty_action_as_none")]
    pub action: Option<FindingAction>,

    /// Identifier of the rule that fired (e.g. `Vale.Spelling`).
    pub check: String,

    /// Long-form explanation.
    #[serde(default)]
    pub description: String,

    /// 1-indexed line number.
    pub line: usize,

    /// Reference URL.
    #[serde(default)]
    pub link: String,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,

    /// Raw severity string as reported.
    pub severity: String,

    /// 1-indexed `[start, end]` column range within the line.
    pub span: [usize; 2],

    /// The exact text the rule flagged.
    #[serde(default)]
    pub r#match: String,
}

fn empty_action_as_none<'de, D>(deserializer: D) -> Result<Option<FindingAction>, D::Error>
where
    D: Deserializer<'de>,
{
    let action = Option::<FindingAction>::deserialize(deserializer)?;
    Ok(action.filter(|a| !a.is_empty()))
}

impl Finding {
    /// Creates a new finding without an action.
    pub fn new(
        check: impl Into<String>,
        severity: Severity,
        line: usize,
        span: [usize; 2],
        matched: impl Into<String>,
    ) -> Self {
        Self {
            action: None,
            check: check.into(),
            description: String::new(),
            line,
            link: String::new(),
            message: String::new(),
            severity: severity.as_str().to_string(),
            span,
            r#match: matched.into(),
        }
    }

    /// Sets the action.
    pub fn with_action(mut self, action: FindingAction) -> Self {
        self.action = Some(action).filter(|a| !a.is_empty());
        self
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the reference link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Returns the parsed severity level.
    pub fn severity_level(&self) -> Severity {
        Severity::parse(&self.severity)
    }
}

/// Vale's response envelope: file name to findings, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingsByFile(IndexMap<String, Vec<Finding>>);

impl FindingsByFile {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the findings for a file.
    pub fn insert(&mut self, file: impl Into<String>, findings: Vec<Finding>) {
        self.0.insert(file.into(), findings);
    }

    /// Returns true if no file has findings.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Total number of findings across all files.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Findings of the first file in the envelope.
    ///
    /// A single submitted text always comes back under a single key
    /// (`stdin.md` or similar), whose name is not meaningful.
    pub fn first_file_findings(&self) -> &[Finding] {
        self.0.values().next().map(Vec::as_slice).unwrap_or_default()
    }

    /// Consumes the envelope and returns the first file's findings.
    pub fn into_first_file_findings(self) -> Vec<Finding> {
        self.0.into_values().next().unwrap_or_default()
    }

    /// Iterates over `(file, findings)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Finding])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
