// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assigns a role to every task in a plan by asking the agent, falling back
//! to a deterministic keyword heuristic when the agent's answer is missing
//! or unusable.
//!
//! Grounded on `orchestrator/roles.py::RolePlanner`.

use crate::error::PlanError;
use crate::plan::Plan;
use crate::planner::parse_tolerant_json;
use numerus_bus::EventBus;
use numerus_core::{Clock, Event};
use numerus_manager::{TaskStatus, TerminalManager};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_ROLES: [&str; 4] = ["queen", "planner", "executor", "reviewer"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub task_id: String,
    pub role: String,
    pub notes: String,
}

pub struct RolePlanner<'a, C: Clock> {
    manager: &'a TerminalManager<C>,
    bus: EventBus,
}

impl<'a, C: Clock + 'static> RolePlanner<'a, C> {
    pub fn new(manager: &'a TerminalManager<C>, bus: EventBus) -> Self {
        Self { manager, bus }
    }

    pub fn assign(
        &self,
        plan: &Plan,
        job_id: &str,
        timeout: Duration,
    ) -> Result<HashMap<String, RoleAssignment>, PlanError> {
        let tasks_blob: String = plan
            .tasks
            .iter()
            .map(|t| format!("- {}: {}", t.task_id, t.summary))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "NUMERUS_ROLES V1\nOBJECTIVE: {}\nTASKS:\n{}\n\nAssign a role from the set {:?} to each task.\nReturn JSON with schema:\n{{\"roles\": [{{\"id\": \"task-id\", \"role\": \"executor\", \"notes\": \"optional\"}}], \"strategy\": \"short guidance\"}}",
            plan.objective, tasks_blob, DEFAULT_ROLES,
        );

        let task_id = format!("roles-{job_id}");
        self.manager.create(&task_id, prompt, HashMap::new(), Some(timeout), serde_json::Map::new())?;
        let record = self.manager.wait_until_terminal(&task_id, timeout + Duration::from_secs(5))?;

        if record.status != TaskStatus::Succeeded {
            return Err(PlanError::Failed {
                task_id,
                reason: record.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let stdout = self.manager.logs(&task_id)?;
        let payload = parse_tolerant_json(&stdout);
        let assignments = Self::to_assignments(payload.ok().as_ref(), plan);

        let roles: HashMap<String, String> =
            assignments.iter().map(|(id, a)| (id.clone(), a.role.clone())).collect();
        self.bus.emit(
            "job.roles_assigned",
            Event::JobRolesAssigned { job_id: job_id.to_string(), roles },
        );

        Ok(assignments)
    }

    fn to_assignments(payload: Option<&Value>, plan: &Plan) -> HashMap<String, RoleAssignment> {
        let mut result = HashMap::new();
        if let Some(roles) = payload.and_then(|p| p.get("roles")).and_then(Value::as_array) {
            for entry in roles {
                let Some(obj) = entry.as_object() else { continue };
                let task_id =
                    obj.get("id").and_then(Value::as_str).unwrap_or("").trim().to_string();
                let role = obj
                    .get("role")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .trim()
                    .to_lowercase();
                let notes =
                    obj.get("notes").and_then(Value::as_str).unwrap_or("").trim().to_string();
                if !task_id.is_empty() && !role.is_empty() {
                    result.insert(task_id.clone(), RoleAssignment { task_id, role, notes });
                }
            }
        }

        if result.is_empty() {
            for task in &plan.tasks {
                let lower = task.summary.to_lowercase();
                let role = if ["plan", "spec", "analysis"].iter().any(|k| lower.contains(k)) {
                    "planner"
                } else if lower.contains("review") || lower.contains("test") {
                    "reviewer"
                } else {
                    "executor"
                };
                result.insert(
                    task.task_id.clone(),
                    RoleAssignment { task_id: task.task_id.clone(), role: role.to_string(), notes: String::new() },
                );
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "roles_tests.rs"]
mod tests;
