// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Distribute impediment time into the sprint window, per day per whitelisted reason, with proportional cap scaling
// role: engine/binning
// inputs: Impediment slice, SprintWindow, ordered reason whitelist, cap (hours/day), DurationStrategy, WorkingHours, `now`
// outputs: Timeline (one hour series per whitelisted reason, aligned with window labels)
// invariants:
// - day indices are absolute offsets from the window start
// - when a day's total exceeds the cap every reason is scaled by cap/total; ratios are preserved
// - series order follows the whitelist; reasons outside it are ignored
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};

use crate::clock::{DurationStrategy, MS_PER_HOUR, WorkingHours};
use crate::model::{Impediment, ReasonSeries, Timeline};
use crate::reason::CanonicalReason;
use crate::util::round2;
use crate::window::SprintWindow;

pub fn bin(
  impediments: &[Impediment],
  window: &SprintWindow,
  whitelist: &[CanonicalReason],
  cap_hours: f64,
  strategy: DurationStrategy,
  hours: &WorkingHours,
  now: DateTime<Utc>,
) -> Timeline {
  let days = window.len();
  let mut bins: Vec<Vec<i64>> = vec![vec![0; days]; whitelist.len()];

  let window_start = hours.day_start(window.start_date);
  let window_end = window
    .end_date
    .succ_opt()
    .map(|next| hours.day_start(next))
    .unwrap_or_else(|| hours.day_start(window.end_date));

  for imp in impediments {
    let Some(row) = whitelist.iter().position(|r| *r == imp.reason) else {
      continue;
    };

    let start = imp.start.max(window_start);
    let end = imp.end.unwrap_or(now).min(window_end);
    if end <= start {
      continue;
    }

    for slice in hours.slices(strategy, start, end) {
      if let Some(idx) = window.day_index(slice.day) {
        bins[row][idx] += slice.ms;
      }
    }
  }

  let mut series: Vec<Vec<f64>> =
    bins.iter().map(|row| row.iter().map(|ms| *ms as f64 / MS_PER_HOUR as f64).collect()).collect();

  for day in 0..days {
    let total: f64 = series.iter().map(|row| row[day]).sum();
    if total > cap_hours {
      let factor = cap_hours / total;
      tracing::trace!(day, total, factor, "scaling timeline day down to cap");
      for row in series.iter_mut() {
        row[day] *= factor;
      }
    }
  }

  Timeline {
    labels: window.labels.clone(),
    cap_hours,
    strategy,
    series: whitelist
      .iter()
      .zip(series)
      .map(|(reason, hours)| ReasonSeries { reason: *reason, hours: hours.into_iter().map(round2).collect() })
      .collect(),
  }
}
