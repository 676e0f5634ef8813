// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The claim: per-task, agent-declared resources and commands, produced by
//! the analysis phase and authoritative over the plan's declared resources.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub task_id: String,
    pub reads: Vec<String>,
    pub writes: Vec<String>,
    pub commands: Vec<String>,
}

impl Claim {
    /// Build from the parsed agent JSON (already run through the tolerant
    /// parser), falling back to the task's plan-declared resources for
    /// anything the claim omits so a thin agent answer still locks what the
    /// plan expected.
    pub fn from_value(task_id: &str, value: &Value, fallback: &numerus_planner::PlanTask) -> Self {
        let resources = value.get("resources").and_then(Value::as_object);
        let reads = resources
            .and_then(|r| r.get("reads"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_else(|| fallback.reads.clone());
        let writes = resources
            .and_then(|r| r.get("writes"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_else(|| fallback.writes.clone());
        let commands = value
            .get("execution")
            .and_then(|e| e.get("commands"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        Self { task_id: task_id.to_string(), reads, writes, commands }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "task_id": self.task_id,
            "resources": { "reads": self.reads, "writes": self.writes },
            "execution": { "commands": self.commands },
        })
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let text =
            serde_json::to_string_pretty(&self.to_value()).expect("Claim always serializes");
        std::fs::write(path, text)
    }
}

#[cfg(test)]
#[path = "claim_tests.rs"]
mod tests;
