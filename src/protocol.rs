//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{GeneratedAssessment, LearnerProfile, Plan, StrategyRequest};

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    pub student_profile: LearnerProfile,
    pub assessment_request: StrategyRequest,
}

#[derive(Debug, Serialize)]
pub struct PlannerOut {
    pub plan_id: String,
    pub reasoning_log: String,
    pub assessment_plan: Plan,
}

#[derive(Debug, Serialize)]
pub struct GenerateOut {
    pub assessment_id: String,
    pub planner_output: PlannerOut,
    pub executor_output: GeneratedAssessment,
    /// RFC 3339, UTC, `Z` suffix.
    pub generated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

fn default_list_limit() -> usize {
    500
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub detail: String,
}
