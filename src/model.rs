// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the JSON model (intervals, impediments, sprints, metrics, dashboard report) shared by the engine and the CLI
// role: model/types
// outputs: Serializable structs with stable snake_case field names
// invariants:
// - Interval.end, when present, is never before Interval.start
// - Impediment ids built from (work item, sprint, start) are deterministic
// - a reopen creates a new Impediment linked via reopened_from; closed records are never reopened in place
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::DurationStrategy;
use crate::error::{InputError, RangeError};
use crate::reason::CanonicalReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
  pub start: DateTime<Utc>,
  pub end: Option<DateTime<Utc>>,
}

impl Interval {
  pub fn open(start: DateTime<Utc>) -> Self {
    Self { start, end: None }
  }

  pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
    if end < start {
      return Err(RangeError::EndBeforeStart { start, end });
    }

    Ok(Self { start, end: Some(end) })
  }

  pub fn is_open(&self) -> bool {
    self.end.is_none()
  }
}

/// A recorded blocking period for one work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Impediment {
  pub id: String,
  pub work_item_id: String,
  #[serde(default)]
  pub work_item_title: String,
  pub sprint_id: String,
  pub start: DateTime<Utc>,
  #[serde(default)]
  pub end: Option<DateTime<Utc>>,
  pub reason: CanonicalReason,
  #[serde(default)]
  pub actor: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub external_link: Option<String>,
  #[serde(default)]
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub responsible: Option<String>,
  #[serde(default)]
  pub reopened_from: Option<String>,
  #[serde(default)]
  pub reopened_at: Option<DateTime<Utc>>,
}

impl Impediment {
  /// Deterministic identity so repeated ingestion upserts instead of duplicating.
  pub fn composite_id(work_item_id: &str, sprint_id: &str, start: DateTime<Utc>) -> String {
    format!("{}-{}-{}", work_item_id, sprint_id, start.timestamp_millis())
  }

  pub fn is_open(&self) -> bool {
    self.end.is_none()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
  pub id: String,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub started: bool,
}

impl Sprint {
  /// Start a sprint of `length_days` beginning on `start_date`.
  pub fn begin(id: String, start_date: NaiveDate, length_days: i64, today: NaiveDate) -> Result<Self, InputError> {
    if start_date > today {
      return Err(InputError::FutureSprintStart { start: start_date, today });
    }

    let end_date = u64::try_from(length_days)
      .ok()
      .filter(|days| *days >= 1)
      .and_then(|days| start_date.checked_add_days(Days::new(days)))
      .ok_or(InputError::SprintEnd { start: start_date, days: length_days })?;

    Ok(Self { id, start_date, end_date, started: true })
  }

  pub fn is_overdue(&self, today: NaiveDate) -> bool {
    self.started && today > self.end_date
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintMetrics {
  pub total_ms: i64,
  pub total_human: String,
  pub blocked_count: usize,
  pub unblocked_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub start_day: u32,
  pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonSeries {
  pub reason: CanonicalReason,
  pub hours: Vec<f64>,
}

/// Per-day, per-reason hour matrix for the sprint window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
  pub labels: Vec<String>,
  pub cap_hours: f64,
  pub strategy: DurationStrategy,
  pub series: Vec<ReasonSeries>,
}

/// Pie totals: parallel `labels` / `hours`, whitelist order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonBreakdown {
  pub labels: Vec<CanonicalReason>,
  pub hours: Vec<f64>,
  pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonTotals {
  pub strategy: DurationStrategy,
  pub active: Option<ReasonBreakdown>,
  pub resolved: Option<ReasonBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedRow {
  pub id: String,
  pub work_item_id: String,
  pub work_item_title: String,
  pub reason: CanonicalReason,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub responsible: Option<String>,
  pub start: DateTime<Utc>,
  pub duration_ms: i64,
  pub duration_human: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub external_link: Option<String>,
  pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnblockedRow {
  pub id: String,
  pub work_item_id: String,
  pub work_item_title: String,
  pub reason: CanonicalReason,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub responsible: Option<String>,
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
  pub duration_ms: i64,
  pub duration_human: String,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub external_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
  pub generated_at: DateTime<Utc>,
  pub sprint_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sprint: Option<Sprint>,
  pub overdue: bool,
  pub window: WindowInfo,
  pub metrics: SprintMetrics,
  pub daily: BTreeMap<NaiveDate, i64>,
  pub reasons: ReasonTotals,
  pub timeline: Timeline,
  pub blocked: Vec<BlockedRow>,
  pub unblocked: Vec<UnblockedRow>,
}
