// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: In-memory impediment and sprint ledger with JSON file persistence, lifecycle actions, and composite-identity upsert
// role: state/ledger
// inputs: Ledger JSON file; lifecycle requests with an explicit instant
// outputs: Mutated Ledger; UpsertOutcome per ingested record
// side_effects: load/save read and write the ledger file
// invariants:
// - a closed record is never reopened in place; reopen appends a new record linked via reopened_from
// - upsert keeps responsible and reopen links from the stored record
// - at most one sprint is held; starting a new one replaces it
// errors: lifecycle actions return crate::error::Error; file IO returns anyhow errors with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::model::{Impediment, Interval, Sprint};
use crate::reason::CanonicalReason;
use crate::window::{derive_sprint_id, format_sprint_id};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
  #[serde(default)]
  pub sprint: Option<Sprint>,
  #[serde(default)]
  pub impediments: Vec<Impediment>,
}

/// Fields for an explicit "start block" action.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImpediment {
  pub work_item_id: String,
  pub work_item_title: String,
  pub reason: CanonicalReason,
  pub actor: String,
  pub external_link: Option<String>,
  pub description: String,
  pub responsible: Option<String>,
}

/// Overrides for a reopen; anything left `None` is inherited from the closed record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReopenRequest {
  pub actor: String,
  pub work_item_title: Option<String>,
  pub reason: Option<CanonicalReason>,
  pub responsible: Option<String>,
  pub external_link: Option<String>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
  Inserted,
  Updated,
}

impl Ledger {
  /// Load from `path`; a missing file is an empty ledger.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    if !path.exists() {
      tracing::debug!(path = %path.display(), "ledger file not found; starting empty");
      return Ok(Self::default());
    }

    let raw = std::fs::read_to_string(path).with_context(|| format!("reading ledger {}", path.display()))?;
    let ledger = serde_json::from_str(&raw).with_context(|| format!("parsing ledger {}", path.display()))?;

    Ok(ledger)
  }

  pub fn save(&self, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(self)?;
    std::fs::write(path, body).with_context(|| format!("writing ledger {}", path.display()))?;

    Ok(())
  }

  pub fn active_sprint(&self) -> Option<&Sprint> {
    self.sprint.as_ref().filter(|s| s.started)
  }

  /// Active sprint id, or the derived weekly id for `today`.
  pub fn sprint_id_for(&self, today: NaiveDate) -> String {
    self.active_sprint().map(|s| s.id.clone()).unwrap_or_else(|| derive_sprint_id(today))
  }

  pub fn start_sprint(&mut self, raw_id: &str, start_date: NaiveDate, length_days: i64, today: NaiveDate) -> Result<&Sprint> {
    let sprint = Sprint::begin(format_sprint_id(raw_id), start_date, length_days, today)?;
    tracing::info!(sprint = %sprint.id, start = %sprint.start_date, end = %sprint.end_date, "sprint started");

    Ok(self.sprint.insert(sprint))
  }

  pub fn end_sprint(&mut self) -> Result<&Sprint> {
    let sprint = self.sprint.as_mut().filter(|s| s.started).ok_or(InputError::NoActiveSprint)?;
    sprint.started = false;

    Ok(sprint)
  }

  fn position(&self, id: &str) -> Result<usize> {
    self
      .impediments
      .iter()
      .position(|imp| imp.id == id)
      .ok_or_else(|| InputError::ImpedimentNotFound(id.to_string()).into())
  }

  pub fn get(&self, id: &str) -> Option<&Impediment> {
    self.impediments.iter().find(|imp| imp.id == id)
  }

  pub fn start_block(&mut self, req: NewImpediment, sprint_id: &str, at: DateTime<Utc>) -> Result<&Impediment> {
    if req.work_item_id.trim().is_empty() {
      return Err(InputError::MissingField("work_item_id").into());
    }

    let record = Impediment {
      id: Impediment::composite_id(&req.work_item_id, sprint_id, at),
      work_item_id: req.work_item_id,
      work_item_title: req.work_item_title,
      sprint_id: sprint_id.to_string(),
      start: at,
      end: None,
      reason: req.reason,
      actor: req.actor,
      external_link: req.external_link,
      description: req.description,
      responsible: req.responsible,
      reopened_from: None,
      reopened_at: None,
    };
    let id = record.id.clone();
    self.upsert(record);

    let idx = self.position(&id)?;
    Ok(&self.impediments[idx])
  }

  pub fn end_block(&mut self, id: &str, at: DateTime<Utc>) -> Result<&Impediment> {
    let idx = self.position(id)?;
    let imp = &mut self.impediments[idx];

    if !imp.is_open() {
      return Err(InputError::AlreadyClosed(id.to_string()).into());
    }
    let closed = Interval::closed(imp.start, at)?;
    imp.end = closed.end;

    Ok(imp)
  }

  pub fn reopen(&mut self, id: &str, req: ReopenRequest, at: DateTime<Utc>) -> Result<&Impediment> {
    let idx = self.position(id)?;
    let original = &self.impediments[idx];

    if original.is_open() {
      return Err(InputError::StillOpen(id.to_string()).into());
    }

    let record = Impediment {
      id: Impediment::composite_id(&original.work_item_id, &original.sprint_id, at),
      work_item_id: original.work_item_id.clone(),
      work_item_title: req.work_item_title.unwrap_or_else(|| original.work_item_title.clone()),
      sprint_id: original.sprint_id.clone(),
      start: at,
      end: None,
      reason: req.reason.unwrap_or(original.reason),
      actor: req.actor,
      external_link: req.external_link.or_else(|| original.external_link.clone()),
      description: req.description.unwrap_or_default(),
      responsible: req.responsible.or_else(|| original.responsible.clone()),
      reopened_from: Some(original.id.clone()),
      reopened_at: Some(at),
    };
    let new_id = record.id.clone();
    self.upsert(record);

    let idx = self.position(&new_id)?;
    Ok(&self.impediments[idx])
  }

  /// Insert or merge by id. Stored responsible and reopen links survive a merge.
  pub fn upsert(&mut self, record: Impediment) -> UpsertOutcome {
    match self.impediments.iter_mut().find(|imp| imp.id == record.id) {
      Some(existing) => {
        let responsible = existing.responsible.take().or(record.responsible.clone());
        let reopened_from = existing.reopened_from.take().or(record.reopened_from.clone());
        let reopened_at = existing.reopened_at.or(record.reopened_at);

        *existing = Impediment { responsible, reopened_from, reopened_at, ..record };
        UpsertOutcome::Updated
      }
      None => {
        self.impediments.push(record);
        UpsertOutcome::Inserted
      }
    }
  }

  pub fn for_sprint(&self, sprint_id: &str) -> Vec<Impediment> {
    self.impediments.iter().filter(|imp| imp.sprint_id == sprint_id).cloned().collect()
  }
}
