// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Error taxonomy for the impediment engine (input, range, configuration)
// role: errors/types
// outputs: InputError, RangeError, ConfigError and the umbrella Error with kind()
// invariants:
// - engine computations never return these; only config construction and ledger actions do
// - every Error maps to exactly one ErrorKind
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// A single malformed input element or an action that does not apply to the ledger state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
  #[error("unparseable timestamp '{0}'")]
  Timestamp(String),

  #[error("unrecognized change field '{0}'\n  hint: valid fields are: status, labels")]
  UnknownField(String),

  #[error("missing required field '{0}'")]
  MissingField(&'static str),

  #[error("impediment not found: {0}")]
  ImpedimentNotFound(String),

  #[error("impediment {0} is already closed")]
  AlreadyClosed(String),

  #[error("impediment {0} is still open\n  hint: end it before reopening")]
  StillOpen(String),

  #[error("sprint start date {start} is after today ({today})")]
  FutureSprintStart { start: NaiveDate, today: NaiveDate },

  #[error("a {days}-day sprint starting {start} has no representable end date")]
  SprintEnd { start: NaiveDate, days: i64 },

  #[error("no active sprint\n  hint: run 'sprint start' first")]
  NoActiveSprint,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
  #[error("end {end} is before start {start}")]
  EndBeforeStart { start: DateTime<Utc>, end: DateTime<Utc> },

  #[error("invalid business hours {start_hour}..{end_hour}: end must be after start and at most 24")]
  BusinessHours { start_hour: u32, end_hour: u32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error(transparent)]
  Range(#[from] RangeError),

  #[error("invalid {name}: {value} (must be a finite, non-negative number)")]
  InvalidCap { name: &'static str, value: f64 },

  #[error("reason whitelist is empty")]
  EmptyWhitelist,

  #[error("reason '{0}' appears more than once in the whitelist")]
  DuplicateReason(String),

  #[error("blocked {0} token must not be empty")]
  EmptyToken(&'static str),

  #[error("unknown timezone '{0}'\n  hint: use an IANA name such as UTC or America/Sao_Paulo")]
  UnknownTimezone(String),

  #[error("sprint length must be between 1 and {max} days, got {days}")]
  SprintLength { days: i64, max: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Input,
  Range,
  Config,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
  #[error(transparent)]
  Input(#[from] InputError),

  #[error(transparent)]
  Range(#[from] RangeError),

  #[error(transparent)]
  Config(#[from] ConfigError),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Input(_) => ErrorKind::Input,
      Error::Range(_) => ErrorKind::Range,
      Error::Config(_) => ErrorKind::Config,
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
