// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns an objective into a [`Plan`] by running one agent invocation that
//! is told to answer in JSON, then parsing whatever it actually says.
//!
//! Grounded on `orchestrator/planner.py::CodexPlanner`: same prompt
//! template, same task-naming convention (`planner-<job>-<rand4>`), same
//! tolerant-parse-then-validate sequence.

use crate::error::PlanError;
use crate::plan::Plan;
use numerus_core::Clock;
use numerus_manager::{TaskStatus, TerminalManager};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

const PROMPT_TEMPLATE: &str = concat!(
    "NUMERUS_PLAN V1. OBJECTIVE: {objective}. ",
    "Return JSON only with schema: ",
    "{\"objective\": string, \"tasks\": [{\"id\": string, \"summary\": string, ",
    "\"description\": string, \"dependencies\": [string], ",
    "\"resources\": {\"reads\": [string], \"writes\": [string]}}]}. ",
    "Use concise ids (kebab-case).",
);

pub struct Planner<'a, C: Clock> {
    manager: &'a TerminalManager<C>,
}

impl<'a, C: Clock + 'static> Planner<'a, C> {
    pub fn new(manager: &'a TerminalManager<C>) -> Self {
        Self { manager }
    }

    pub fn generate_plan(
        &self,
        objective: &str,
        job_id: &str,
        timeout: Duration,
    ) -> Result<Plan, PlanError> {
        let task_id = format!("planner-{job_id}-{}", nanoid::nanoid!(4, &numerus_core::id::HEX_ALPHABET));
        let prompt = PROMPT_TEMPLATE.replace("{objective}", objective.trim());

        self.manager.create(&task_id, prompt, HashMap::new(), Some(timeout), serde_json::Map::new())?;
        let record = self.manager.wait_until_terminal(&task_id, timeout + Duration::from_secs(5))?;

        if record.status != TaskStatus::Succeeded {
            return Err(PlanError::Failed {
                task_id,
                reason: record.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let stdout = self.manager.logs(&task_id)?;
        info!(task_id = %task_id, "planner produced output");
        let value = parse_tolerant_json(&stdout)?;
        build_plan(objective, &value)
    }
}

/// Try strict JSON first; on failure, locate the outermost `{...}` substring
/// and parse that.
///
/// Exposed beyond this crate because the job runner's claim phase parses
/// agent JSON with this same tolerant parser rather than a second copy of
/// the same logic.
pub fn parse_tolerant_json(raw: &str) -> Result<Value, PlanError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(PlanError::EmptyOutput);
    }
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    let start = text.find('{').ok_or(PlanError::Unparsable)?;
    let end = text.rfind('}').ok_or(PlanError::Unparsable)?;
    if end < start {
        return Err(PlanError::Unparsable);
    }
    serde_json::from_str(&text[start..=end]).map_err(|_| PlanError::Unparsable)
}

fn build_plan(objective: &str, payload: &Value) -> Result<Plan, PlanError> {
    let plan = Plan::from_value(payload);
    if plan.tasks.is_empty() {
        return Err(PlanError::NoTasks);
    }
    Ok(Plan { objective: objective.to_string(), tasks: plan.tasks })
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
