//! Problem catalog: the keyed store of problems and the snapshot capability the selector reads.
//!
//! Two backends:
//!   - in-memory (seeded or empty), used when no catalog file is configured and in tests
//!   - a JSON file holding an array of problems, re-read on every operation
//!
//! Each operation holds the store lock for its whole read-modify-write, so a
//! snapshot never observes a half-applied update.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info, instrument};

use crate::domain::Problem;
use crate::error::CatalogError;

/// Point-in-time view of every problem the catalog knows about.
pub trait CatalogSnapshot: Send + Sync {
  fn snapshot(&self) -> Result<Vec<Problem>, CatalogError>;
}

enum Backend {
  Memory(RwLock<Vec<Problem>>),
  File { path: PathBuf, lock: RwLock<()> },
}

pub struct ProblemStore {
  backend: Backend,
}

impl ProblemStore {
  pub fn in_memory(problems: Vec<Problem>) -> Self {
    Self { backend: Backend::Memory(RwLock::new(problems)) }
  }

  /// Open a file-backed store, creating the file as `[]` if it does not exist yet.
  #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
  pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
    let path = path.as_ref().to_path_buf();
    if !path.exists() {
      write_file(&path, &[])?;
      info!(target: "catalog", path = %path.display(), "Created empty catalog file");
    }
    Ok(Self { backend: Backend::File { path, lock: RwLock::new(()) } })
  }

  /// Where the catalog lives, for logs.
  pub fn describe(&self) -> String {
    match &self.backend {
      Backend::Memory(_) => "memory".into(),
      Backend::File { path, .. } => path.display().to_string(),
    }
  }

  fn read_all(&self) -> Result<Vec<Problem>, CatalogError> {
    match &self.backend {
      Backend::Memory(data) => Ok(data.read().map_err(|_| CatalogError::Poisoned)?.clone()),
      Backend::File { path, lock } => {
        let _guard = lock.read().map_err(|_| CatalogError::Poisoned)?;
        read_file(path)
      }
    }
  }

  /// Run `f` against the full problem list under the write lock and persist the result.
  fn modify<T>(&self, f: impl FnOnce(&mut Vec<Problem>) -> Result<T, CatalogError>) -> Result<T, CatalogError> {
    match &self.backend {
      Backend::Memory(data) => {
        let mut data = data.write().map_err(|_| CatalogError::Poisoned)?;
        f(&mut *data)
      }
      Backend::File { path, lock } => {
        let _guard = lock.write().map_err(|_| CatalogError::Poisoned)?;
        let mut data = read_file(path)?;
        let out = f(&mut data)?;
        write_file(path, &data)?;
        Ok(out)
      }
    }
  }

  pub fn list(&self, skip: usize, limit: usize) -> Result<Vec<Problem>, CatalogError> {
    Ok(self.read_all()?.into_iter().skip(skip).take(limit).collect())
  }

  pub fn get(&self, id: &str) -> Result<Option<Problem>, CatalogError> {
    Ok(self.read_all()?.into_iter().find(|p| p.id == id))
  }

  pub fn len(&self) -> Result<usize, CatalogError> {
    Ok(self.read_all()?.len())
  }

  #[instrument(level = "debug", skip(self, problem), fields(id = %problem.id))]
  pub fn insert(&self, problem: Problem) -> Result<(), CatalogError> {
    self.modify(|data| {
      if data.iter().any(|p| p.id == problem.id) {
        return Err(CatalogError::Duplicate(problem.id));
      }
      debug!(target: "catalog", id = %problem.id, topic = %problem.topic, "Problem inserted");
      data.push(problem);
      Ok(())
    })
  }

  /// Replace the record stored under `id`.
  #[instrument(level = "debug", skip(self, problem))]
  pub fn update(&self, id: &str, problem: Problem) -> Result<(), CatalogError> {
    self.modify(|data| match data.iter_mut().find(|p| p.id == id) {
      Some(slot) => {
        *slot = problem;
        Ok(())
      }
      None => Err(CatalogError::NotFound(id.to_string())),
    })
  }

  #[instrument(level = "debug", skip(self))]
  pub fn delete(&self, id: &str) -> Result<(), CatalogError> {
    self.modify(|data| {
      let before = data.len();
      data.retain(|p| p.id != id);
      if data.len() == before {
        return Err(CatalogError::NotFound(id.to_string()));
      }
      Ok(())
    })
  }
}

impl CatalogSnapshot for ProblemStore {
  fn snapshot(&self) -> Result<Vec<Problem>, CatalogError> {
    self.read_all()
  }
}

fn read_file(path: &Path) -> Result<Vec<Problem>, CatalogError> {
  let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
  serde_json::from_str(&raw).map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })
}

fn write_file(path: &Path, data: &[Problem]) -> Result<(), CatalogError> {
  let body = serde_json::to_string_pretty(data).map_err(|source| CatalogError::Parse { path: path.to_path_buf(), source })?;
  fs::write(path, body).map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })
}
