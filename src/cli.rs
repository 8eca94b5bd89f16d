// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the CLI surface (global engine flags plus sprint/block/ingest/report subcommands) and normalize it
// role: cli/parsing
// inputs: argv via clap derive
// outputs: Cli, Command, EffectiveConfig (engine settings, ledger path, now override, command)
// invariants:
// - engine flags are global so they may appear before or after the subcommand
// - reasons given on the command line go through the canonicalizer
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::clock::DurationStrategy;
use crate::config::EngineSettings;
use crate::reason::{CanonicalReason, canonicalize};

#[derive(Parser, Debug)]
#[command(
    name = "impediment-report",
    version,
    about = "Track sprint impediments and export blocked-time metrics as JSON",
    long_about = None
)]
pub struct Cli {
  /// Ledger file holding the sprint and impediment records
  #[arg(long, global = true, default_value = "impediments.json")]
  pub ledger: PathBuf,

  /// IANA timezone for calendar-day boundaries, e.g. America/Sao_Paulo
  #[arg(long, global = true, default_value = "UTC")]
  pub tz: String,

  /// First business hour of the day (0-23)
  #[arg(long, global = true, default_value_t = 9)]
  pub business_start_hour: u32,

  /// Business day end hour (exclusive, 1-24)
  #[arg(long, global = true, default_value_t = 18)]
  pub business_end_hour: u32,

  /// Display cap for per-day aggregate blocked hours
  #[arg(long, global = true, default_value_t = 8.0)]
  pub daily_cap_hours: f64,

  /// Visual cap for the stacked timeline, hours per day
  #[arg(long, global = true, default_value_t = 8.0)]
  pub timeline_cap_hours: f64,

  /// Active blocks at or above this many business hours are flagged critical
  #[arg(long, global = true, default_value_t = 8.0)]
  pub critical_hours: f64,

  /// Ordered reason whitelist for charts (comma-separated; default: all but Other)
  #[arg(long, global = true, value_delimiter = ',', value_parser = parse_reason)]
  pub reasons: Vec<CanonicalReason>,

  /// Status name that marks an item blocked
  #[arg(long, global = true, default_value = "blocked")]
  pub blocked_status: String,

  /// Substring that also marks a status blocked (empty disables)
  #[arg(long, global = true, default_value = "impedido")]
  pub blocked_synonym: String,

  /// Label token that marks an item blocked
  #[arg(long, global = true, default_value = "blocked")]
  pub blocked_label: String,

  /// Sprint length in days used by `sprint start`
  #[arg(long, global = true, default_value_t = 15)]
  pub sprint_days: i64,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant (hidden; tests only)
  #[arg(long = "now-override", global = true, hide = true)]
  pub now_override: Option<String>,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
  /// Start or end the active sprint
  Sprint {
    #[command(subcommand)]
    action: SprintAction,
  },

  /// Record impediments by hand
  Block {
    #[command(subcommand)]
    action: BlockAction,
  },

  /// Extract impediments from an issue-tracker export (issues with changelog) and upsert them
  Ingest {
    /// JSON file: an array of issues or a search response with `issues`
    #[arg(long)]
    issues: PathBuf,

    /// Sprint to file records under (default: active sprint, else the weekly id)
    #[arg(long)]
    sprint_id: Option<String>,

    /// Tracker base URL used for browse links, e.g. https://acme.atlassian.net
    #[arg(long)]
    base_url: Option<String>,
  },

  /// Export the dashboard report for a sprint as JSON
  Report {
    /// Sprint to report on (default: active sprint, else the weekly id)
    #[arg(long)]
    sprint_id: Option<String>,

    /// Sum pie totals in wall-clock time instead of business hours
    #[arg(long)]
    wall_clock: bool,

    /// Duration strategy for the timeline bins
    #[arg(long, value_enum)]
    timeline_strategy: Option<DurationStrategy>,

    /// Output file path (default stdout "-")
    #[arg(long, default_value = "-")]
    out: String,
  },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SprintAction {
  /// Start a sprint; the id is masked to Sprint-XXXX
  Start {
    #[arg(long)]
    id: String,

    /// First day of the sprint, YYYY-MM-DD (default: today)
    #[arg(long)]
    start_date: Option<NaiveDate>,
  },

  /// Mark the active sprint as ended
  End,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockAction {
  /// Open an impediment on a work item, starting now
  Start {
    #[arg(long)]
    item: String,

    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, value_parser = parse_reason)]
    reason: CanonicalReason,

    #[arg(long)]
    responsible: Option<String>,

    #[arg(long)]
    link: Option<String>,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, default_value = "cli")]
    actor: String,

    /// Sprint to file the record under (default: active sprint, else the weekly id)
    #[arg(long)]
    sprint_id: Option<String>,
  },

  /// Close an open impediment now
  End {
    #[arg(long)]
    id: String,
  },

  /// Open a new impediment linked to a closed one
  Reopen {
    #[arg(long)]
    id: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long, value_parser = parse_reason)]
    reason: Option<CanonicalReason>,

    #[arg(long)]
    responsible: Option<String>,

    #[arg(long)]
    link: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long, default_value = "cli")]
    actor: String,
  },
}

fn parse_reason(raw: &str) -> std::result::Result<CanonicalReason, String> {
  Ok(canonicalize(raw))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub settings: EngineSettings,
  pub ledger: PathBuf,
  pub now_override: Option<String>,
  pub command: Command,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let Some(command) = cli.command else {
    bail!("Provide a subcommand: sprint, block, ingest, or report");
  };

  let defaults = EngineSettings::default();
  let reasons = if cli.reasons.is_empty() { defaults.reasons.clone() } else { cli.reasons };
  let timeline_strategy = match &command {
    Command::Report { timeline_strategy: Some(s), .. } => *s,
    _ => defaults.timeline_strategy,
  };

  let settings = EngineSettings {
    tz: cli.tz,
    business_start_hour: cli.business_start_hour,
    business_end_hour: cli.business_end_hour,
    daily_cap_hours: cli.daily_cap_hours,
    timeline_cap_hours: cli.timeline_cap_hours,
    critical_hours: cli.critical_hours,
    reasons,
    blocked_status: cli.blocked_status,
    blocked_synonym: cli.blocked_synonym,
    blocked_label: cli.blocked_label,
    sprint_days: cli.sprint_days,
    timeline_strategy,
  };

  Ok(EffectiveConfig { settings, ledger: cli.ledger, now_override: cli.now_override, command })
}
