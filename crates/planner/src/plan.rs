// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plan model: an objective plus an ordered sequence of task
//! descriptors, persisted as `plan.json` immediately after planning and
//! immutable thereafter.
//!
//! Deserialization is deliberately tolerant of the variant shapes an LLM's
//! JSON-only answer actually produces: `id`/`task_id`, `summary`/`title`,
//! `description`/`details`, and `dependencies`/`requires` are accepted as
//! synonyms, and a bare string where a list is expected is coerced into a
//! one-element list. A plain `#[serde(alias = ...)]` can't express the
//! single-string-to-list coercion, so both types get a manual `Deserialize`
//! built on `serde_json::Value`.

use crate::error::PlanError;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct PlanTask {
    pub task_id: String,
    pub summary: String,
    pub description: String,
    pub dependencies: Vec<String>,
    pub reads: Vec<String>,
    pub writes: Vec<String>,
}

impl PlanTask {
    fn from_value(value: &Value) -> Self {
        let obj = value.as_object();

        let task_id = field_str(obj, &["id", "task_id"])
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("task-{}", nanoid::nanoid!(6, &numerus_core::id::HEX_ALPHABET)));
        let summary = field_str(obj, &["summary", "title"])
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "No summary provided".to_string());
        let description = field_str(obj, &["description", "details"]).unwrap_or_default();
        let dependencies = field_list(obj, &["dependencies", "requires"]);

        let resources = obj.and_then(|o| o.get("resources")).and_then(Value::as_object);
        let reads = resources.and_then(|r| r.get("reads")).map(coerce_str_list).unwrap_or_default();
        let writes = resources.and_then(|r| r.get("writes")).map(coerce_str_list).unwrap_or_default();

        Self { task_id, summary, description, dependencies, reads, writes }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(Map::from_iter([
            ("id".to_string(), Value::String(self.task_id.clone())),
            ("summary".to_string(), Value::String(self.summary.clone())),
            ("description".to_string(), Value::String(self.description.clone())),
            (
                "dependencies".to_string(),
                Value::Array(self.dependencies.iter().cloned().map(Value::String).collect()),
            ),
            (
                "resources".to_string(),
                serde_json::json!({
                    "reads": self.reads,
                    "writes": self.writes,
                }),
            ),
        ]))
    }
}

impl<'de> Deserialize<'de> for PlanTask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self::from_value(&Value::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub objective: String,
    pub tasks: Vec<PlanTask>,
}

impl Plan {
    pub(crate) fn from_value(value: &Value) -> Self {
        let obj = value.as_object();
        let objective = field_str(obj, &["objective", "goal"]).unwrap_or_default();
        let tasks = obj
            .and_then(|o| o.get("tasks"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter(|i| i.is_object()).map(PlanTask::from_value).collect())
            .unwrap_or_default();
        Self { objective, tasks }
    }

    /// Strict parse only; the tolerant outermost-`{...}` fallback lives in
    /// the planner, which is the only caller that sees raw agent stdout.
    pub fn from_json(text: &str) -> Result<Self, PlanError> {
        let value: Value = serde_json::from_str(text).map_err(|_| PlanError::Unparsable)?;
        Ok(Self::from_value(&value))
    }

    pub fn to_json_pretty(&self) -> String {
        let value = serde_json::json!({
            "objective": self.objective,
            "tasks": self.tasks.iter().map(PlanTask::to_value).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }

    pub fn write_to(&self, path: &Path) -> Result<(), PlanError> {
        Ok(std::fs::write(path, self.to_json_pretty())?)
    }

    pub fn read_from(path: &Path) -> Result<Self, PlanError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

fn field_str(obj: Option<&Map<String, Value>>, keys: &[&str]) -> Option<String> {
    let obj = obj?;
    keys.iter().find_map(|key| obj.get(*key)).and_then(Value::as_str).map(str::to_string)
}

fn field_list(obj: Option<&Map<String, Value>>, keys: &[&str]) -> Vec<String> {
    let Some(obj) = obj else { return Vec::new() };
    keys.iter().find_map(|key| obj.get(*key)).map(coerce_str_list).unwrap_or_default()
}

fn coerce_str_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
