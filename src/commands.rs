// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate each subcommand: load the ledger, apply the action or build the report, save, print JSON
// role: processing/orchestrator
// inputs: EffectiveConfig, validated EngineConfig, resolved now
// outputs: JSON on stdout (or --out for reports); updated ledger file
// side_effects: Reads the ledger and issue exports; writes the ledger and report files; prints to stdout
// invariants:
// - the ledger is saved only after an action succeeds
// - ingestion extracts per issue in parallel but applies upserts in input order
// errors: Propagates lifecycle and IO errors with file path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::cli::{BlockAction, Command, EffectiveConfig, SprintAction};
use crate::clock::DurationStrategy;
use crate::config::EngineConfig;
use crate::jira::{IssueHistory, parse_issues};
use crate::ledger::{Ledger, NewImpediment, ReopenRequest, UpsertOutcome};
use crate::render::{ReportParams, build_report};
use crate::util::write_json_out;

#[derive(Debug, Serialize)]
pub struct IngestSummary {
  pub sprint_id: String,
  pub issues: usize,
  pub intervals: usize,
  pub inserted: usize,
  pub updated: usize,
}

pub fn run(cfg: &EffectiveConfig, engine: &EngineConfig, now: DateTime<Utc>) -> Result<()> {
  let today = engine.hours.local_date(now);

  match &cfg.command {
    Command::Sprint { action } => {
      let mut ledger = Ledger::load(&cfg.ledger)?;
      let sprint = match action {
        SprintAction::Start { id, start_date } => {
          ledger.start_sprint(id, start_date.unwrap_or(today), engine.sprint_days, today)?.clone()
        }
        SprintAction::End => ledger.end_sprint()?.clone(),
      };
      ledger.save(&cfg.ledger)?;
      write_json_out("-", &sprint)
    }

    Command::Block { action } => {
      let mut ledger = Ledger::load(&cfg.ledger)?;
      let record = match action {
        BlockAction::Start { item, title, reason, responsible, link, description, actor, sprint_id } => {
          let sprint_id = sprint_id.clone().unwrap_or_else(|| ledger.sprint_id_for(today));
          let req = NewImpediment {
            work_item_id: item.clone(),
            work_item_title: title.clone(),
            reason: *reason,
            actor: actor.clone(),
            external_link: link.clone(),
            description: description.clone(),
            responsible: responsible.clone(),
          };
          ledger.start_block(req, &sprint_id, now)?.clone()
        }
        BlockAction::End { id } => ledger.end_block(id, now)?.clone(),
        BlockAction::Reopen { id, title, reason, responsible, link, description, actor } => {
          let req = ReopenRequest {
            actor: actor.clone(),
            work_item_title: title.clone(),
            reason: *reason,
            responsible: responsible.clone(),
            external_link: link.clone(),
            description: description.clone(),
          };
          ledger.reopen(id, req, now)?.clone()
        }
      };
      ledger.save(&cfg.ledger)?;
      write_json_out("-", &record)
    }

    Command::Ingest { issues, sprint_id, base_url } => {
      let raw = std::fs::read_to_string(issues).with_context(|| format!("reading issues {}", issues.display()))?;
      let doc: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing issues {}", issues.display()))?;
      let histories = parse_issues(&doc)?;

      let mut ledger = Ledger::load(&cfg.ledger)?;
      let sprint_id = sprint_id.clone().unwrap_or_else(|| ledger.sprint_id_for(today));
      let summary = ingest(&mut ledger, engine, &histories, &sprint_id, base_url.as_deref(), now);
      ledger.save(&cfg.ledger)?;
      write_json_out("-", &summary)
    }

    Command::Report { sprint_id, wall_clock, out, .. } => {
      let ledger = Ledger::load(&cfg.ledger)?;
      let params = ReportParams {
        sprint_id: sprint_id.clone(),
        pie_strategy: if *wall_clock { DurationStrategy::WallClock } else { DurationStrategy::Business },
        timeline_strategy: engine.timeline_strategy,
        now,
      };
      let report = build_report(&ledger, engine, &params);
      write_json_out(out, &report)
    }
  }
}

/// Extract every issue's intervals and upsert the resulting records.
pub fn ingest(
  ledger: &mut Ledger,
  engine: &EngineConfig,
  histories: &[IssueHistory],
  sprint_id: &str,
  base_url: Option<&str>,
  now: DateTime<Utc>,
) -> IngestSummary {
  let records: Vec<_> = histories
    .par_iter()
    .map(|issue| {
      let intervals = issue.extract_intervals(&engine.matcher, now);
      issue.to_impediments(&intervals, sprint_id, base_url)
    })
    .collect();

  let mut summary =
    IngestSummary { sprint_id: sprint_id.to_string(), issues: histories.len(), intervals: 0, inserted: 0, updated: 0 };

  for record in records.into_iter().flatten() {
    summary.intervals += 1;
    match ledger.upsert(record) {
      UpsertOutcome::Inserted => summary.inserted += 1,
      UpsertOutcome::Updated => summary.updated += 1,
    }
  }

  tracing::info!(
    sprint = %summary.sprint_id,
    issues = summary.issues,
    inserted = summary.inserted,
    updated = summary.updated,
    "ingestion applied"
  );

  summary
}
