//! Domain models: problems, learner input, difficulty tiers, plans and generated assessments.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Lowest and highest difficulty a catalog problem may carry.
pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

/// One catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
  pub id: String,
  pub text: String,
  pub topic: String,
  pub difficulty: u8,
  pub estimated_time_to_solve_minutes: u32,
}

impl Problem {
  /// Structural checks applied at the HTTP boundary before a record enters the catalog.
  pub fn validate(&self) -> Result<(), String> {
    if self.id.trim().is_empty() {
      return Err("id must not be empty".into());
    }
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
      return Err(format!(
        "difficulty must be within {MIN_DIFFICULTY}..={MAX_DIFFICULTY}, got {}",
        self.difficulty
      ));
    }
    if self.estimated_time_to_solve_minutes == 0 {
      return Err("estimated_time_to_solve_minutes must be positive".into());
    }
    Ok(())
  }
}

/// Read-only learner input. `learning_history` is carried through but never interpreted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LearnerProfile {
  #[serde(rename = "id", alias = "student_id")]
  pub student_id: String,
  pub current_level: String,
  #[serde(default)]
  pub learning_history: Vec<serde_json::Value>,
  #[serde(default)]
  pub learning_goals: Vec<String>,
  #[serde(default)]
  pub mastered_topics: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategyRequest {
  /// Values <= 0 are clamped to 1 by the planner.
  pub max_total_time_minutes: i64,
  pub pedagogical_strategy: String,
}

/// Pedagogical strategy recognised by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
  Review,
  NewTopicIntroduction,
  Challenge,
  /// Anything we don't recognise.
  Default,
}

impl Strategy {
  /// Case-insensitive label match; unknown labels map to `Strategy::Default`.
  pub fn from_label(label: &str) -> Self {
    match label.to_uppercase().as_str() {
      "REVIEW" => Strategy::Review,
      "NEW_TOPIC_INTRODUCTION" => Strategy::NewTopicIntroduction,
      "CHALLENGE" => Strategy::Challenge,
      _ => Strategy::Default,
    }
  }
}

/// Difficulty bucket. Partitions 1..=5 as easy={1,2}, medium={3}, hard={4,5}.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
  Easy,
  Medium,
  Hard,
}

impl Tier {
  pub fn of(difficulty: u8) -> Option<Tier> {
    match difficulty {
      1 | 2 => Some(Tier::Easy),
      3 => Some(Tier::Medium),
      4 | 5 => Some(Tier::Hard),
      _ => None,
    }
  }

  pub fn contains(self, difficulty: u8) -> bool {
    Tier::of(difficulty) == Some(self)
  }

  pub fn label(self) -> &'static str {
    match self {
      Tier::Easy => "easy",
      Tier::Medium => "medium",
      Tier::Hard => "hard",
    }
  }
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Ordered tier -> percentage mapping. Iteration order drives both count
/// reconciliation and metadata rendering, so it is kept explicit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifficultyDistribution {
  entries: Vec<(Tier, u32)>,
}

impl DifficultyDistribution {
  pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
    Self { entries: vec![(Tier::Easy, easy), (Tier::Medium, medium), (Tier::Hard, hard)] }
  }

  /// Custom distribution. A tier repeated later overrides the earlier percentage
  /// but keeps its first position.
  #[allow(dead_code)]
  pub fn from_entries<I: IntoIterator<Item = (Tier, u32)>>(entries: I) -> Self {
    let mut out: Vec<(Tier, u32)> = Vec::new();
    for (tier, pct) in entries {
      match out.iter_mut().find(|(t, _)| *t == tier) {
        Some(slot) => slot.1 = pct,
        None => out.push((tier, pct)),
      }
    }
    Self { entries: out }
  }

  pub fn entries(&self) -> &[(Tier, u32)] {
    &self.entries
  }

  pub fn total_percent(&self) -> u32 {
    self.entries.iter().map(|(_, p)| *p).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl Serialize for DifficultyDistribution {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (tier, pct) in &self.entries {
      map.serialize_entry(tier.label(), pct)?;
    }
    map.end()
  }
}

impl fmt::Display for DifficultyDistribution {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("{")?;
    for (i, (tier, pct)) in self.entries.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "'{}': {}", tier.label(), pct)?;
    }
    f.write_str("}")
  }
}

/// Output of the planner. Immutable once built.
#[derive(Clone, Debug, Serialize)]
pub struct Plan {
  pub plan_id: String,
  pub selected_topics: Vec<String>,
  pub difficulty_distribution: DifficultyDistribution,
  pub num_questions: usize,
  pub target_total_time: u32,
  /// Free text for humans; nothing downstream parses it.
  pub reasoning_log: String,
}

/// Output of the selector.
#[derive(Clone, Debug, Serialize)]
pub struct GeneratedAssessment {
  pub assessment_id: String,
  pub plan_id: String,
  pub problems: Vec<Problem>,
  /// Sum of the chosen problems' minutes; wide enough that no catalog can overflow it.
  pub total_estimated_time: u64,
  pub metadata: BTreeMap<String, String>,
}
