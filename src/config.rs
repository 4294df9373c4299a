//! Loading service configuration (planner tuning, catalog location, selection seed,
//! server options) from TOML, plus a few env overrides.
//!
//! See `ServiceConfig` for the expected schema. Every section is optional.

use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ServiceConfig {
  #[serde(default)]
  pub planner: PlannerConfig,
  #[serde(default)]
  pub catalog: CatalogConfig,
  #[serde(default)]
  pub selection: SelectionConfig,
  #[serde(default)]
  pub server: ServerConfig,
}

/// Planner tuning.
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerConfig {
  /// Sizing heuristic: a plan asks for `max_time / avg_minutes_per_question` questions.
  #[serde(default = "default_avg_minutes")]
  pub avg_minutes_per_question: u32,
}

impl Default for PlannerConfig {
  fn default() -> Self {
    Self { avg_minutes_per_question: default_avg_minutes() }
  }
}

fn default_avg_minutes() -> u32 { 5 }

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogConfig {
  /// JSON file backing the catalog. Without it the catalog lives in memory.
  #[serde(default)]
  pub path: Option<String>,
  /// Seed the in-memory catalog with the built-in sample problems.
  #[serde(default = "default_true")]
  pub seed_builtin: bool,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self { path: None, seed_builtin: true }
  }
}

fn default_true() -> bool { true }

#[derive(Clone, Debug, Deserialize, Default)]
pub struct SelectionConfig {
  /// Fixed RNG seed. When absent every request draws a fresh seed.
  #[serde(default)]
  pub seed: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_port")]
  pub port: u16,
  /// Empty means any origin.
  #[serde(default = "default_origins")]
  pub allow_origins: Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { port: default_port(), allow_origins: default_origins() }
  }
}

fn default_port() -> u16 { 8000 }

fn default_origins() -> Vec<String> {
  vec!["http://localhost:3000".into(), "https://localhost:3000".into()]
}

/// Attempt to load `ServiceConfig` from ASSESSMENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_service_config_from_env() -> Option<ServiceConfig> {
  let path = std::env::var("ASSESSMENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<ServiceConfig>(&s) {
      Ok(cfg) => {
        info!(target: "assessment_backend", %path, "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "assessment_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "assessment_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// File config (or defaults) with PORT, PROBLEM_CATALOG_PATH and SELECTION_SEED applied on top.
pub fn resolve_config() -> ServiceConfig {
  let mut cfg = load_service_config_from_env().unwrap_or_default();
  apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
  cfg
}

fn apply_env_overrides(cfg: &mut ServiceConfig, var: impl Fn(&str) -> Option<String>) {
  if let Some(p) = var("PORT") {
    match p.parse::<u16>() {
      Ok(port) => cfg.server.port = port,
      Err(_) => warn!(target: "assessment_backend", value = %p, "Ignoring invalid PORT"),
    }
  }
  if let Some(path) = var("PROBLEM_CATALOG_PATH").filter(|p| !p.trim().is_empty()) {
    cfg.catalog.path = Some(path);
  }
  if let Some(s) = var("SELECTION_SEED") {
    match s.parse::<u64>() {
      Ok(seed) => cfg.selection.seed = Some(seed),
      Err(_) => warn!(target: "assessment_backend", value = %s, "Ignoring invalid SELECTION_SEED"),
    }
  }
}
