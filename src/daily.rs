// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Bucket impediment business time per calendar day with a display cap; sprint totals and status counts
// role: engine/aggregation
// inputs: Impediment slice, WorkingHours, daily cap (ms), explicit `now`
// outputs: DailyMetrics (capped per-day map, capped sprint total, blocked/unblocked work-item counts)
// invariants:
// - no day in by_day exceeds the cap
// - sprint_total_ms is the sum of the capped per-day values
// - a work item is blocked if any of its records is open
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::WorkingHours;
use crate::model::{Impediment, SprintMetrics};
use crate::util::format_duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMetrics {
  pub by_day: BTreeMap<NaiveDate, i64>,
  pub sprint_total_ms: i64,
  pub blocked_count: usize,
  pub unblocked_count: usize,
}

impl DailyMetrics {
  pub fn sprint_metrics(&self) -> SprintMetrics {
    SprintMetrics {
      total_ms: self.sprint_total_ms,
      total_human: format_duration(self.sprint_total_ms),
      blocked_count: self.blocked_count,
      unblocked_count: self.unblocked_count,
    }
  }
}

pub fn aggregate(impediments: &[Impediment], hours: &WorkingHours, cap_ms: i64, now: DateTime<Utc>) -> DailyMetrics {
  let mut raw: BTreeMap<NaiveDate, i64> = BTreeMap::new();

  for imp in impediments {
    let end = imp.end.unwrap_or(now);
    for slice in hours.business_slices(imp.start, end) {
      *raw.entry(slice.day).or_insert(0) += slice.ms;
    }
  }

  // the clamp applies to the day's aggregate, not to any single impediment
  let by_day: BTreeMap<NaiveDate, i64> = raw.into_iter().map(|(day, ms)| (day, ms.min(cap_ms))).collect();
  let sprint_total_ms = by_day.values().sum();

  let mut open_by_item: HashMap<&str, bool> = HashMap::new();
  for imp in impediments {
    let entry = open_by_item.entry(imp.work_item_id.as_str()).or_insert(false);
    *entry |= imp.is_open();
  }
  let blocked_count = open_by_item.values().filter(|open| **open).count();
  let unblocked_count = open_by_item.len() - blocked_count;

  DailyMetrics { by_day, sprint_total_ms, blocked_count, unblocked_count }
}
