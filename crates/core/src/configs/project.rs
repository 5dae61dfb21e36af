use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::tasks::{Command, TaskKind};

fn default_required() -> bool {
    true
}

/// One sub-project the dispatcher visits, in configuration order.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,
    /// Directory of the project, relative to the workspace root.
    pub path: String,
    /// A missing required directory aborts the run; a missing optional one is skipped.
    #[serde(default = "default_required")]
    pub required: bool,
    pub description: Option<String>,
    /// Commands used instead of `scripts/<kind>.<ext>` for the given kinds.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<TaskKind, Command>,
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            required,
            description: None,
            commands: BTreeMap::new(),
        }
    }

    pub fn command_for(&self, kind: TaskKind) -> Option<&Command> {
        self.commands.get(&kind)
    }
}
