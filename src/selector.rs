//! Problem selector: turns a plan plus a catalog snapshot into a concrete, bounded set of problems.
//!
//! Flow:
//! 1) Candidate pool = problems on the plan's topics, widened to the whole catalog
//!    when that pool is smaller than the question count.
//! 2) Per-tier counts = floor(pct/100 * n), reconciled to exactly n
//!    (round-robin increments, or decrements from the largest tier).
//! 3) Pool is shuffled once; each tier takes its count in shuffled order.
//! 4) Short tiers are back-filled from any unchosen candidate.
//! 5) While over the time budget, the hardest remaining problem is dropped.
//!
//! Trimming tie-break: among problems sharing the current maximum difficulty,
//! the one chosen earliest goes first (stable descending sort, front removal).

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::CatalogSnapshot;
use crate::domain::{DifficultyDistribution, GeneratedAssessment, Plan, Problem, Tier};
use crate::error::CatalogError;

/// Selector bound to a catalog. The catalog is read once per `select` call.
pub struct ProblemSelector<C: ?Sized> {
  catalog: Arc<C>,
}

impl<C: CatalogSnapshot + ?Sized> ProblemSelector<C> {
  pub fn new(catalog: Arc<C>) -> Self {
    Self { catalog }
  }

  /// Snapshot the catalog and select against it. A catalog failure is returned
  /// unchanged; it is never turned into an empty assessment.
  pub fn select<R: Rng + ?Sized>(&self, plan: &Plan, rng: &mut R) -> Result<GeneratedAssessment, CatalogError> {
    let snapshot = self.catalog.snapshot().map_err(|e| {
      if e.is_unavailable() {
        warn!(target: "selection", plan_id = %plan.plan_id, error = %e, "Catalog snapshot unavailable");
      }
      e
    })?;
    Ok(select_from_snapshot(plan, &snapshot, rng))
  }
}

/// Per-tier target counts summing to `target` (or fewer, only when every count has hit zero).
pub fn tier_counts(distribution: &DifficultyDistribution, target: usize) -> Vec<(Tier, usize)> {
  if distribution.is_empty() {
    return Vec::new();
  }
  let mut counts: Vec<(Tier, usize)> = distribution
    .entries()
    .iter()
    .map(|&(tier, pct)| (tier, (pct as u64 * target as u64 / 100) as usize))
    .collect();

  let mut assigned: usize = counts.iter().map(|(_, c)| c).sum();
  let mut i = 0;
  while assigned < target {
    let slot = i % counts.len();
    counts[slot].1 += 1;
    assigned += 1;
    i += 1;
  }
  while assigned > target {
    // First tier holding the largest count.
    let mut largest = 0;
    for (idx, (_, c)) in counts.iter().enumerate() {
      if *c > counts[largest].1 {
        largest = idx;
      }
    }
    if counts[largest].1 == 0 {
      break;
    }
    counts[largest].1 -= 1;
    assigned -= 1;
  }
  counts
}

fn candidate_pool(plan: &Plan, snapshot: &[Problem]) -> Vec<Problem> {
  let on_topic: Vec<Problem> = snapshot
    .iter()
    .filter(|p| plan.selected_topics.iter().any(|t| *t == p.topic))
    .cloned()
    .collect();
  if on_topic.len() < plan.num_questions {
    debug!(
      target: "selection",
      on_topic = on_topic.len(),
      wanted = plan.num_questions,
      catalog = snapshot.len(),
      "Topic pool too small; widening to whole catalog"
    );
    snapshot.to_vec()
  } else {
    on_topic
  }
}

fn total_minutes(problems: &[Problem]) -> u64 {
  problems.iter().map(|p| u64::from(p.estimated_time_to_solve_minutes)).sum()
}

/// Drop hardest-first until the chosen set fits `budget` or is empty.
fn trim_to_budget(chosen: &mut Vec<Problem>, budget: u32) -> u64 {
  let budget = u64::from(budget);
  let mut total = total_minutes(chosen);
  while total > budget && !chosen.is_empty() {
    let mut by_difficulty: Vec<usize> = (0..chosen.len()).collect();
    by_difficulty.sort_by(|&a, &b| chosen[b].difficulty.cmp(&chosen[a].difficulty));
    let removed = chosen.remove(by_difficulty[0]);
    debug!(target: "selection", id = %removed.id, difficulty = removed.difficulty, "Trimmed to respect time budget");
    total = total_minutes(chosen);
  }
  total
}

#[instrument(level = "info", skip_all, fields(plan_id = %plan.plan_id, num_questions = plan.num_questions))]
pub fn select_from_snapshot<R: Rng + ?Sized>(plan: &Plan, snapshot: &[Problem], rng: &mut R) -> GeneratedAssessment {
  let mut candidates = candidate_pool(plan, snapshot);
  let counts = tier_counts(&plan.difficulty_distribution, plan.num_questions);

  candidates.shuffle(rng);

  let mut chosen: Vec<Problem> = Vec::with_capacity(plan.num_questions);
  let mut taken: HashSet<String> = HashSet::new();

  for &(tier, want) in &counts {
    let mut got = 0;
    for p in &candidates {
      if got >= want {
        break;
      }
      if tier.contains(p.difficulty) && !taken.contains(&p.id) {
        taken.insert(p.id.clone());
        chosen.push(p.clone());
        got += 1;
      }
    }
    if got < want {
      debug!(target: "selection", %tier, want, got, "Tier short of candidates");
    }
  }

  if chosen.len() < plan.num_questions {
    for p in &candidates {
      if chosen.len() >= plan.num_questions {
        break;
      }
      if taken.insert(p.id.clone()) {
        chosen.push(p.clone());
      }
    }
  }

  let before_trim = chosen.len();
  let total_estimated_time = trim_to_budget(&mut chosen, plan.target_total_time);
  if chosen.len() < before_trim {
    warn!(
      target: "selection",
      removed = before_trim - chosen.len(),
      budget = plan.target_total_time,
      "Selection trimmed to fit time budget"
    );
  }

  let mut metadata = BTreeMap::new();
  metadata.insert("strategy".to_string(), plan.difficulty_distribution.to_string());
  metadata.insert("target_time".to_string(), plan.target_total_time.to_string());

  let assessment = GeneratedAssessment {
    assessment_id: Uuid::new_v4().to_string(),
    plan_id: plan.plan_id.clone(),
    problems: chosen,
    total_estimated_time,
    metadata,
  };
  info!(
    target: "selection",
    assessment_id = %assessment.assessment_id,
    pool = candidates.len(),
    chosen = assessment.problems.len(),
    total_time = assessment.total_estimated_time,
    "Assessment assembled"
  );
  assessment
}
