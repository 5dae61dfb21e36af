use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::SweepError;

/// The kind of maintenance action being dispatched.
///
/// The lowercase name doubles as the stem of the per-project script
/// (`scripts/format.sh`, `scripts/validate.sh`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Format,
    Validate,
    Test,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Format, TaskKind::Validate, TaskKind::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Format => "format",
            TaskKind::Validate => "validate",
            TaskKind::Test => "test",
        }
    }

    /// Label used in headings, e.g. "Formatting".
    pub fn verb(&self) -> &'static str {
        match self {
            TaskKind::Format => "Formatting",
            TaskKind::Validate => "Validating",
            TaskKind::Test => "Testing",
        }
    }

    /// File name of the per-project script for this kind.
    pub fn script_file_name(&self, extension: &str) -> String {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            self.as_str().to_string()
        } else {
            format!("{}.{}", self.as_str(), extension)
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                SweepError::Task(format!(
                    "Unknown task kind '{}' (expected one of: format, validate, test)",
                    s
                ))
            })
    }
}

/// A command configured in place of a per-project script.
///
/// `Single` runs through the platform shell, `Multiple` is an argv list whose
/// first element is the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    Single(String),
    Multiple(Vec<String>),
}
