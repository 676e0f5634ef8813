// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns an objective into an ordered, dependency-aware [`Plan`] by running
//! the agent as a manager task and parsing its JSON-only answer, then
//! assigns a role to each task the same way.

mod error;
mod plan;
mod planner;
mod roles;

pub use error::PlanError;
pub use plan::{Plan, PlanTask};
pub use planner::{parse_tolerant_json, Planner};
pub use roles::{RoleAssignment, RolePlanner, DEFAULT_ROLES};
