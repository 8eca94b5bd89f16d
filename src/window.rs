// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Derive the labeled day range of the current or fallback sprint, plus sprint id derivation and masking
// role: engine/windowing
// inputs: Optional Sprint, today's calendar date
// outputs: SprintWindow (inclusive start/end dates, one label per day, start day-of-month)
// invariants:
// - labels.len() equals the number of days in [start_date, end_date]
// - day_index uses absolute day offsets, so windows crossing a month boundary index correctly
// - the fallback window stays inside the current month
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Sprint, WindowInfo};

const FALLBACK_DAYS: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintWindow {
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub labels: Vec<String>,
  pub start_day: u32,
}

impl SprintWindow {
  /// Window for a started sprint, or a half-month fallback anchored on the 1st or 16th.
  pub fn resolve(sprint: Option<&Sprint>, today: NaiveDate) -> Self {
    match sprint.filter(|s| s.started) {
      Some(s) => Self::spanning(s.start_date, s.end_date),
      None => Self::fallback(today),
    }
  }

  /// Inclusive range; an end before the start degrades to a single day.
  pub fn spanning(start_date: NaiveDate, end_date: NaiveDate) -> Self {
    let end_date = end_date.max(start_date);
    let labels = start_date
      .iter_days()
      .take_while(|d| *d <= end_date)
      .map(|d| d.format("%d/%m").to_string())
      .collect();

    Self { start_date, end_date, labels, start_day: start_date.day() }
  }

  pub fn fallback(today: NaiveDate) -> Self {
    let start_day = if today.day() <= FALLBACK_DAYS { 1 } else { 16 };
    let last = last_day_of_month(today.year(), today.month());
    let end_day = (start_day + FALLBACK_DAYS - 1).min(last);

    // both days lie inside the current month
    let start_date = today.with_day(start_day).unwrap_or(today);
    let end_date = today.with_day(end_day).unwrap_or(today);

    Self::spanning(start_date, end_date)
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  /// Absolute offset of `day` from the window start, if it falls inside the window.
  pub fn day_index(&self, day: NaiveDate) -> Option<usize> {
    let offset = (day - self.start_date).num_days();

    if offset < 0 || offset as usize >= self.len() {
      return None;
    }

    Some(offset as usize)
  }

  pub fn info(&self) -> WindowInfo {
    WindowInfo {
      start_date: self.start_date,
      end_date: self.end_date,
      start_day: self.start_day,
      labels: self.labels.clone(),
    }
  }
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
  let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };

  NaiveDate::from_ymd_opt(ny, nm, 1)
    .and_then(|first_next| first_next.pred_opt())
    .map(|last| last.day())
    .unwrap_or(28)
}

/// Weekly sprint id `Sprint-YYYY-WW`, weeks counted from the Sunday-aligned week holding Jan 1.
pub fn derive_sprint_id(date: NaiveDate) -> String {
  let jan1_weekday = NaiveDate::from_ymd_opt(date.year(), 1, 1)
    .map(|d| d.weekday().num_days_from_sunday())
    .unwrap_or(0);
  let n = date.ordinal0() + jan1_weekday + 1;
  let week = n.div_ceil(7);

  format!("Sprint-{}-{:02}", date.year(), week)
}

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("static regex"));

/// Mask a user-entered sprint id into `Sprint-XXXX` form.
pub fn format_sprint_id(raw: &str) -> String {
  let clean = NON_ALNUM.replace_all(raw, "").to_uppercase();
  let clean = clean.strip_prefix("SPRINT").unwrap_or(&clean);

  format!("Sprint-{}", clean)
}
