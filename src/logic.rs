//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - The assessment pipeline: plan -> catalog snapshot -> selection -> response envelope
//!   - Catalog CRUD with boundary validation of problem records

use chrono::{SecondsFormat, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{LearnerProfile, Problem, StrategyRequest};
use crate::error::ApiError;
use crate::planner::build_plan;
use crate::protocol::{GenerateOut, PlannerOut};
use crate::selector::ProblemSelector;
use crate::state::AppState;

#[instrument(level = "info", skip_all, fields(student_id = %profile.student_id))]
pub fn generate_assessment(
  state: &AppState,
  profile: &LearnerProfile,
  request: &StrategyRequest,
) -> Result<GenerateOut, ApiError> {
  let plan = build_plan(profile, request, &state.planner);
  let selector = ProblemSelector::new(state.catalog.clone());
  let mut rng = state.selection_rng();
  let generated = selector.select(&plan, &mut rng)?;

  if generated.problems.len() < plan.num_questions {
    info!(
      target: "selection",
      plan_id = %plan.plan_id,
      wanted = plan.num_questions,
      got = generated.problems.len(),
      "Short assessment returned"
    );
  }

  Ok(GenerateOut {
    assessment_id: Uuid::new_v4().to_string(),
    planner_output: PlannerOut {
      plan_id: plan.plan_id.clone(),
      reasoning_log: plan.reasoning_log.clone(),
      assessment_plan: plan,
    },
    executor_output: generated,
    generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
  })
}

pub fn list_problems(state: &AppState, skip: usize, limit: usize) -> Result<Vec<Problem>, ApiError> {
  Ok(state.catalog.list(skip, limit)?)
}

pub fn get_problem(state: &AppState, id: &str) -> Result<Problem, ApiError> {
  state
    .catalog
    .get(id)?
    .ok_or_else(|| ApiError::NotFound("Problem not found".into()))
}

#[instrument(level = "info", skip(state, problem), fields(id = %problem.id))]
pub fn create_problem(state: &AppState, problem: Problem) -> Result<Problem, ApiError> {
  problem.validate().map_err(ApiError::InvalidProblem)?;
  state.catalog.insert(problem.clone())?;
  info!(target: "catalog", id = %problem.id, topic = %problem.topic, "Problem created");
  Ok(problem)
}

#[instrument(level = "info", skip(state, problem))]
pub fn update_problem(state: &AppState, id: &str, problem: Problem) -> Result<Problem, ApiError> {
  if problem.id != id {
    return Err(ApiError::InvalidProblem(format!(
      "body id '{}' does not match path id '{}'",
      problem.id, id
    )));
  }
  problem.validate().map_err(ApiError::InvalidProblem)?;
  state.catalog.update(id, problem.clone())?;
  info!(target: "catalog", %id, "Problem updated");
  Ok(problem)
}

#[instrument(level = "info", skip(state))]
pub fn delete_problem(state: &AppState, id: &str) -> Result<(), ApiError> {
  state.catalog.delete(id)?;
  info!(target: "catalog", %id, "Problem deleted");
  Ok(())
}
