//! Plan builder: turns a learner profile and a strategy request into an abstract plan
//! (topics, difficulty mix, question count, time budget).
//!
//! Pure and stateless apart from the freshly generated plan id.

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::domain::{DifficultyDistribution, LearnerProfile, Plan, Strategy, StrategyRequest};

/// Upper bound on the number of questions in any plan.
pub const MAX_QUESTIONS: usize = 50;
/// At most this many topics are taken from goals or mastered topics.
pub const MAX_TOPICS: usize = 3;
/// Topic used when the profile names none.
pub const FALLBACK_TOPIC: &str = "General Math";

/// Strategy -> easy/medium/hard percentages.
pub fn distribution_for(strategy: Strategy) -> DifficultyDistribution {
  match strategy {
    Strategy::Review => DifficultyDistribution::new(60, 35, 5),
    Strategy::NewTopicIntroduction => DifficultyDistribution::new(50, 40, 10),
    Strategy::Challenge => DifficultyDistribution::new(20, 50, 30),
    Strategy::Default => DifficultyDistribution::new(50, 40, 10),
  }
}

/// Goals first, then mastered topics for review, then the fallback topic.
fn select_topics(profile: &LearnerProfile) -> (Vec<String>, &'static str) {
  if !profile.learning_goals.is_empty() {
    let topics = profile.learning_goals.iter().take(MAX_TOPICS).cloned().collect();
    (topics, "Focusing on learning goals.")
  } else if !profile.mastered_topics.is_empty() {
    let topics = profile.mastered_topics.iter().take(MAX_TOPICS).cloned().collect();
    (topics, "No new goals; focusing on mastered topics for review.")
  } else {
    (vec![FALLBACK_TOPIC.to_string()], "No explicit topics provided; using General Math.")
  }
}

/// Clamped budget (>= 1 minute) and the question count derived from it, in [1, MAX_QUESTIONS].
pub fn size_plan(max_total_time_minutes: i64, avg_minutes_per_question: u32) -> (u32, usize) {
  let max_time = max_total_time_minutes.clamp(1, u32::MAX as i64) as u32;
  let avg = avg_minutes_per_question.max(1);
  let num_questions = ((max_time / avg) as usize).clamp(1, MAX_QUESTIONS);
  (max_time, num_questions)
}

#[instrument(level = "info", skip_all, fields(student_id = %profile.student_id, strategy = %request.pedagogical_strategy))]
pub fn build_plan(profile: &LearnerProfile, request: &StrategyRequest, cfg: &PlannerConfig) -> Plan {
  let (selected_topics, rationale) = select_topics(profile);
  let strategy = Strategy::from_label(&request.pedagogical_strategy);
  let difficulty_distribution = distribution_for(strategy);

  let avg = cfg.avg_minutes_per_question.max(1);
  let (target_total_time, num_questions) = size_plan(request.max_total_time_minutes, avg);

  let reasoning_log = format!(
    "Planner reasoning: {rationale} Strategy={}. Estimated questions based on max_time {target_total_time} and avg_time_per_q {avg}.",
    request.pedagogical_strategy
  );

  let plan = Plan {
    plan_id: Uuid::new_v4().to_string(),
    selected_topics,
    difficulty_distribution,
    num_questions,
    target_total_time,
    reasoning_log,
  };
  debug!(
    target: "planner",
    plan_id = %plan.plan_id,
    topics = ?plan.selected_topics,
    ?strategy,
    mix_percent = plan.difficulty_distribution.total_percent(),
    num_questions,
    target_total_time,
    "Plan built"
  );
  plan
}
