// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for instant parsing, "now" resolution, duration formatting, rounding, JSON output, and man page rendering
// role: utilities/helpers
// inputs: Timestamp strings; DateTime; millisecond counts; clap CommandFactory
// outputs: Parsed instants, human-readable durations, rounded hours, written JSON, man page text
// side_effects: write_json_out writes to stdout or creates the target file (and parents)
// invariants:
// - parse_instant accepts RFC3339, tracker offsets without a colon, and naive UTC timestamps
// - format_duration is locale-independent and stable
// errors: parse_instant returns InputError::Timestamp; IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use clap::CommandFactory;

use crate::clock::MS_PER_HOUR;
use crate::error::InputError;

/// Parse an instant from the formats trackers and users hand us.
///
/// Accepts RFC3339 (`2024-01-10T09:00:00Z`), tracker-style offsets
/// (`2024-01-10T09:00:00.000+0000`), and naive timestamps taken as UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, InputError> {
  let s = raw.trim();

  DateTime::parse_from_rfc3339(s)
    .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|_| {
      NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|ndt| Utc.from_utc_datetime(&ndt))
    })
    .map_err(|_| InputError::Timestamp(raw.to_string()))
}

/// Parse a `--now-override` string; unparseable input is treated as absent.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Utc>> {
  s.and_then(|raw| parse_instant(raw).ok())
}

/// Returns the effective "now" given an optional override.
///
/// This is the only place the binary reads the system clock; every engine
/// call receives the resolved instant explicitly.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Round to two decimal places.
pub fn round2(v: f64) -> f64 {
  (v * 100.0).round() / 100.0
}

/// Milliseconds to hours, rounded to two decimals.
pub fn ms_to_hours(ms: i64) -> f64 {
  round2(ms as f64 / MS_PER_HOUR as f64)
}

/// Human-readable duration: "30s", "5m", "2h 30m", "1 day and 5 hours".
pub fn format_duration(ms: i64) -> String {
  let s = ms.max(0) / 1000;
  let d = s / 86_400;
  let h = (s % 86_400) / 3600;
  let m = (s % 3600) / 60;

  if s < 60 {
    return format!("{s}s");
  }

  if d > 0 {
    let days = if d > 1 { "days" } else { "day" };
    let hours = if h == 1 { "hour" } else { "hours" };
    return format!("{d} {days} and {h} {hours}");
  }

  if h > 0 {
    return format!("{h}h {m}m");
  }

  format!("{m}m")
}

/// Write pretty JSON to stdout ("-") or to a file, creating parent directories.
pub fn write_json_out<T: serde::Serialize>(out: &str, value: &T) -> Result<()> {
  let body = serde_json::to_string_pretty(value)?;

  if out == "-" {
    println!("{}", body);
    return Ok(());
  }

  let path = Path::new(out);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;

  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
