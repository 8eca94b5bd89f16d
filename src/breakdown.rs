// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Per-reason pie totals and blocked/unblocked table rows for the presentation layer
// role: engine/presentation-feeds
// inputs: Impediment slice, WorkingHours, DurationStrategy, reason whitelist, critical threshold, `now`
// outputs: Option<ReasonBreakdown>, Vec<BlockedRow>, Vec<UnblockedRow>
// invariants:
// - pie totals list only whitelisted reasons that have data, in whitelist order
// - blocked rows are sorted by duration descending; unblocked rows by end descending
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{DurationStrategy, WorkingHours};
use crate::model::{BlockedRow, Impediment, ReasonBreakdown, UnblockedRow};
use crate::reason::CanonicalReason;
use crate::util::{format_duration, ms_to_hours, round2};

/// Which impediments feed a pie chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
  Active,
  Resolved,
}

impl StatusFilter {
  fn accepts(&self, imp: &Impediment) -> bool {
    match self {
      StatusFilter::Active => imp.is_open(),
      StatusFilter::Resolved => !imp.is_open(),
    }
  }
}

pub fn reason_totals(
  impediments: &[Impediment],
  filter: StatusFilter,
  strategy: DurationStrategy,
  whitelist: &[CanonicalReason],
  hours: &WorkingHours,
  now: DateTime<Utc>,
) -> Option<ReasonBreakdown> {
  let mut per_reason: HashMap<CanonicalReason, i64> = HashMap::new();
  let mut any = false;

  for imp in impediments.iter().filter(|imp| filter.accepts(imp)) {
    any = true;
    let ms = hours.duration(strategy, Some(imp.start), imp.end, now);
    *per_reason.entry(imp.reason).or_insert(0) += ms;
  }

  if !any {
    return None;
  }

  let (labels, values): (Vec<CanonicalReason>, Vec<f64>) = whitelist
    .iter()
    .filter_map(|reason| per_reason.get(reason).map(|ms| (*reason, ms_to_hours(*ms))))
    .unzip();
  let total_hours = round2(values.iter().sum());

  Some(ReasonBreakdown { labels, hours: values, total_hours })
}

pub fn blocked_rows(
  impediments: &[Impediment],
  hours: &WorkingHours,
  critical_ms: i64,
  now: DateTime<Utc>,
) -> Vec<BlockedRow> {
  let mut rows: Vec<BlockedRow> = impediments
    .iter()
    .filter(|imp| imp.is_open())
    .map(|imp| {
      let duration_ms = hours.business_duration(Some(imp.start), None, now);
      BlockedRow {
        id: imp.id.clone(),
        work_item_id: imp.work_item_id.clone(),
        work_item_title: imp.work_item_title.clone(),
        reason: imp.reason,
        responsible: imp.responsible.clone(),
        start: imp.start,
        duration_ms,
        duration_human: format_duration(duration_ms),
        external_link: imp.external_link.clone(),
        critical: duration_ms >= critical_ms,
      }
    })
    .collect();

  rows.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms).then_with(|| a.id.cmp(&b.id)));
  rows
}

pub fn unblocked_rows(impediments: &[Impediment], hours: &WorkingHours, now: DateTime<Utc>) -> Vec<UnblockedRow> {
  let mut rows: Vec<UnblockedRow> = impediments
    .iter()
    .filter_map(|imp| {
      let end = imp.end?;
      let duration_ms = hours.business_duration(Some(imp.start), Some(end), now);
      Some(UnblockedRow {
        id: imp.id.clone(),
        work_item_id: imp.work_item_id.clone(),
        work_item_title: imp.work_item_title.clone(),
        reason: imp.reason,
        responsible: imp.responsible.clone(),
        start: imp.start,
        end,
        duration_ms,
        duration_human: format_duration(duration_ms),
        description: imp.description.clone(),
        external_link: imp.external_link.clone(),
      })
    })
    .collect();

  rows.sort_by(|a, b| b.end.cmp(&a.end).then_with(|| a.id.cmp(&b.id)));
  rows
}
