// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::plan::PlanTask;
use numerus_core::SystemClock;

fn sample_plan() -> Plan {
    Plan {
        objective: "ship it".to_string(),
        tasks: vec![
            PlanTask {
                task_id: "spec-api".to_string(),
                summary: "Write the API spec".to_string(),
                description: String::new(),
                dependencies: vec![],
                reads: vec![],
                writes: vec![],
            },
            PlanTask {
                task_id: "build-api".to_string(),
                summary: "Implement the endpoint".to_string(),
                description: String::new(),
                dependencies: vec!["spec-api".to_string()],
                reads: vec![],
                writes: vec![],
            },
            PlanTask {
                task_id: "review-api".to_string(),
                summary: "Review and test the endpoint".to_string(),
                description: String::new(),
                dependencies: vec!["build-api".to_string()],
                reads: vec![],
                writes: vec![],
            },
        ],
    }
}

#[test]
fn assigns_roles_from_well_formed_agent_output() {
    let payload: Value = serde_json::from_str(
        r#"{"roles": [
            {"id": "spec-api", "role": "Planner", "notes": "kick things off"},
            {"id": "build-api", "role": "executor"},
            {"id": "review-api", "role": "reviewer"}
        ]}"#,
    )
    .expect("json");
    let plan = sample_plan();
    let assignments = RolePlanner::<SystemClock>::to_assignments(Some(&payload), &plan);
    assert_eq!(assignments["spec-api"].role, "planner");
    assert_eq!(assignments["spec-api"].notes, "kick things off");
    assert_eq!(assignments["build-api"].role, "executor");
    assert_eq!(assignments["review-api"].role, "reviewer");
}

#[test]
fn falls_back_to_keyword_heuristic_when_agent_output_has_no_roles() {
    let plan = sample_plan();
    let assignments = RolePlanner::<SystemClock>::to_assignments(None, &plan);
    assert_eq!(assignments["spec-api"].role, "planner");
    assert_eq!(assignments["build-api"].role, "executor");
    assert_eq!(assignments["review-api"].role, "reviewer");
}

#[test]
fn falls_back_when_roles_array_is_empty() {
    let payload: Value = serde_json::from_str(r#"{"roles": []}"#).expect("json");
    let plan = sample_plan();
    let assignments = RolePlanner::<SystemClock>::to_assignments(Some(&payload), &plan);
    assert_eq!(assignments["build-api"].role, "executor");
}
