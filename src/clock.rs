// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Business-hours-clipped and wall-clock durations between instants, split per calendar day
// role: engine/clock
// inputs: start instant (optional), end instant (optional), explicit evaluation instant `now`
// outputs: Milliseconds (i64); per-day DaySlice lists
// invariants:
// - missing start or end <= start yields 0 (never an error)
// - open intervals are evaluated as of the caller-supplied `now`; no ambient clock reads
// - every calendar day (weekends included) contributes its business window
// - results are monotonic non-decreasing in `end` for a fixed `start`
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::RangeError;

pub const MS_PER_HOUR: i64 = 3_600_000;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Which clock a duration is measured with.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum DurationStrategy {
  /// Only time inside the daily business window counts.
  Business,
  /// Raw elapsed time.
  WallClock,
}

/// Milliseconds attributed to one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlice {
  pub day: NaiveDate,
  pub ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkingHours {
  start_hour: u32,
  end_hour: u32,
  tz: Tz,
}

impl WorkingHours {
  pub fn new(start_hour: u32, end_hour: u32, tz: Tz) -> Result<Self, RangeError> {
    if end_hour <= start_hour || end_hour > 24 {
      return Err(RangeError::BusinessHours { start_hour, end_hour });
    }

    Ok(Self { start_hour, end_hour, tz })
  }

  pub fn daily_capacity_ms(&self) -> i64 {
    (self.end_hour - self.start_hour) as i64 * MS_PER_HOUR
  }

  /// Calendar date of `at` in the configured zone.
  pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&self.tz).date_naive()
  }

  /// Instant at which `day` begins in the configured zone.
  pub fn day_start(&self, day: NaiveDate) -> DateTime<Utc> {
    self.at_hour(day, 0)
  }

  /// Business window `[open, close]` for `day`.
  pub fn business_window(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (self.at_hour(day, self.start_hour), self.at_hour(day, self.end_hour))
  }

  // A wall time that falls in a DST gap resolves to the first valid instant after it.
  fn at_hour(&self, day: NaiveDate, hour: u32) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN) + Duration::hours(hour as i64);

    self
      .tz
      .from_local_datetime(&naive)
      .earliest()
      .or_else(|| self.tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
      .map(|dt| dt.with_timezone(&Utc))
      .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
  }

  /// Split `[start, end]` into per-day business-window intersections.
  ///
  /// Every calendar day from `start`'s date through `end`'s date gets an entry,
  /// including days whose intersection is empty. Degenerate ranges yield nothing.
  pub fn business_slices(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DaySlice> {
    if end <= start {
      return Vec::new();
    }

    let last = self.local_date(end);

    self
      .local_date(start)
      .iter_days()
      .take_while(|day| *day <= last)
      .map(|day| {
        let (open, close) = self.business_window(day);
        DaySlice { day, ms: overlap_ms(start, end, open, close) }
      })
      .collect()
  }

  /// Split `[start, end]` into per-day wall-clock slices (midnight to midnight).
  pub fn wall_slices(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DaySlice> {
    if end <= start {
      return Vec::new();
    }

    let last = self.local_date(end);

    self
      .local_date(start)
      .iter_days()
      .take_while(|day| *day <= last)
      .map(|day| {
        let open = self.day_start(day);
        let close = day.succ_opt().map(|next| self.day_start(next)).unwrap_or(end);
        DaySlice { day, ms: overlap_ms(start, end, open, close) }
      })
      .collect()
  }

  pub fn slices(&self, strategy: DurationStrategy, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DaySlice> {
    match strategy {
      DurationStrategy::Business => self.business_slices(start, end),
      DurationStrategy::WallClock => self.wall_slices(start, end),
    }
  }

  /// Business-hours duration of `[start, end]`; an absent `end` means "still open as of `now`".
  pub fn business_duration(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(start) = start else { return 0 };
    let end = end.unwrap_or(now);

    self.business_slices(start, end).iter().map(|s| s.ms).sum()
  }

  /// Raw elapsed milliseconds with the same null handling as `business_duration`.
  pub fn wall_duration(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(start) = start else { return 0 };
    let end = end.unwrap_or(now);

    (end - start).num_milliseconds().max(0)
  }

  pub fn duration(
    &self,
    strategy: DurationStrategy,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
  ) -> i64 {
    match strategy {
      DurationStrategy::Business => self.business_duration(start, end, now),
      DurationStrategy::WallClock => self.wall_duration(start, end, now),
    }
  }
}

fn overlap_ms(start: DateTime<Utc>, end: DateTime<Utc>, open: DateTime<Utc>, close: DateTime<Utc>) -> i64 {
  let seg_start = start.max(open);
  let seg_end = end.min(close);

  if seg_end > seg_start {
    (seg_end - seg_start).num_milliseconds()
  } else {
    0
  }
}
