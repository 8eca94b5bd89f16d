// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Plain engine settings and their validated, injected form (business hours, caps, whitelist, blocked tokens)
// role: config/validation
// inputs: EngineSettings (from CLI flags or JSON)
// outputs: EngineConfig or ConfigError
// invariants:
// - validation happens once, at construction; engine calls never re-validate
// - business capacity (end - start hours) and display caps are independent values
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::changelog::BlockedMatcher;
use crate::clock::{DurationStrategy, MS_PER_HOUR, WorkingHours};
use crate::error::ConfigError;
use crate::reason::CanonicalReason;

/// Longest sprint `sprint start` accepts.
pub const MAX_SPRINT_DAYS: i64 = 366;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
  pub tz: String,
  pub business_start_hour: u32,
  pub business_end_hour: u32,
  pub daily_cap_hours: f64,
  pub timeline_cap_hours: f64,
  pub critical_hours: f64,
  pub reasons: Vec<CanonicalReason>,
  pub blocked_status: String,
  pub blocked_synonym: String,
  pub blocked_label: String,
  pub sprint_days: i64,
  pub timeline_strategy: DurationStrategy,
}

impl Default for EngineSettings {
  fn default() -> Self {
    Self {
      tz: "UTC".into(),
      business_start_hour: 9,
      business_end_hour: 18,
      daily_cap_hours: 8.0,
      timeline_cap_hours: 8.0,
      critical_hours: 8.0,
      reasons: CanonicalReason::DEFAULT_WHITELIST.to_vec(),
      blocked_status: "blocked".into(),
      blocked_synonym: "impedido".into(),
      blocked_label: "blocked".into(),
      sprint_days: 15,
      timeline_strategy: DurationStrategy::WallClock,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
  pub hours: WorkingHours,
  pub daily_cap_ms: i64,
  pub timeline_cap_hours: f64,
  pub critical_ms: i64,
  pub whitelist: Vec<CanonicalReason>,
  pub matcher: BlockedMatcher,
  pub sprint_days: i64,
  pub timeline_strategy: DurationStrategy,
}

impl EngineConfig {
  pub fn new(settings: &EngineSettings) -> Result<Self, ConfigError> {
    let tz: Tz = settings.tz.parse().map_err(|_| ConfigError::UnknownTimezone(settings.tz.clone()))?;
    let hours = WorkingHours::new(settings.business_start_hour, settings.business_end_hour, tz)?;

    let daily_cap_ms = hours_to_ms("daily cap", settings.daily_cap_hours)?;
    let critical_ms = hours_to_ms("critical threshold", settings.critical_hours)?;
    check_cap("timeline cap", settings.timeline_cap_hours)?;

    if settings.reasons.is_empty() {
      return Err(ConfigError::EmptyWhitelist);
    }
    let mut seen = HashSet::new();
    for reason in &settings.reasons {
      if !seen.insert(*reason) {
        return Err(ConfigError::DuplicateReason(reason.label().to_string()));
      }
    }

    let status = normalized_token("status", &settings.blocked_status)?;
    let label = normalized_token("label", &settings.blocked_label)?;
    // an empty synonym just disables synonym matching
    let synonym = settings.blocked_synonym.trim().to_lowercase();

    if !(1..=MAX_SPRINT_DAYS).contains(&settings.sprint_days) {
      return Err(ConfigError::SprintLength { days: settings.sprint_days, max: MAX_SPRINT_DAYS });
    }

    Ok(Self {
      hours,
      daily_cap_ms,
      timeline_cap_hours: settings.timeline_cap_hours,
      critical_ms,
      whitelist: settings.reasons.clone(),
      matcher: BlockedMatcher { status, synonym, label },
      sprint_days: settings.sprint_days,
      timeline_strategy: settings.timeline_strategy,
    })
  }
}

fn check_cap(name: &'static str, value: f64) -> Result<(), ConfigError> {
  if !value.is_finite() || value < 0.0 {
    return Err(ConfigError::InvalidCap { name, value });
  }

  Ok(())
}

fn hours_to_ms(name: &'static str, value: f64) -> Result<i64, ConfigError> {
  check_cap(name, value)?;

  Ok((value * MS_PER_HOUR as f64).round() as i64)
}

fn normalized_token(name: &'static str, raw: &str) -> Result<String, ConfigError> {
  let token = raw.trim().to_lowercase();

  if token.is_empty() {
    return Err(ConfigError::EmptyToken(name));
  }

  Ok(token)
}
