// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Assemble the dashboard report (window, metrics, daily caps, pie totals, timeline, tables) for one sprint
// role: rendering/report
// inputs: Ledger, EngineConfig, ReportParams (sprint id, strategies, now)
// outputs: DashboardReport
// invariants:
// - every engine call receives params.now; nothing here reads the clock
// - only impediments tagged with the report's sprint id are included
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};

use crate::breakdown::{StatusFilter, blocked_rows, reason_totals, unblocked_rows};
use crate::clock::DurationStrategy;
use crate::config::EngineConfig;
use crate::daily;
use crate::ledger::Ledger;
use crate::model::{DashboardReport, ReasonTotals};
use crate::timeline;
use crate::window::SprintWindow;

#[derive(Debug, Clone)]
pub struct ReportParams {
  /// Defaults to the active sprint, else the derived weekly id.
  pub sprint_id: Option<String>,
  pub pie_strategy: DurationStrategy,
  pub timeline_strategy: DurationStrategy,
  pub now: DateTime<Utc>,
}

pub fn build_report(ledger: &Ledger, cfg: &EngineConfig, p: &ReportParams) -> DashboardReport {
  let hours = &cfg.hours;
  let today = hours.local_date(p.now);
  let sprint_id = p.sprint_id.clone().unwrap_or_else(|| ledger.sprint_id_for(today));

  let sprint = ledger.sprint.clone().filter(|s| s.id == sprint_id);
  let window = SprintWindow::resolve(sprint.as_ref(), today);
  let impediments = ledger.for_sprint(&sprint_id);

  let metrics = daily::aggregate(&impediments, hours, cfg.daily_cap_ms, p.now);
  let totals = |filter| reason_totals(&impediments, filter, p.pie_strategy, &cfg.whitelist, hours, p.now);
  let reasons = ReasonTotals {
    strategy: p.pie_strategy,
    active: totals(StatusFilter::Active),
    resolved: totals(StatusFilter::Resolved),
  };
  let timeline = timeline::bin(
    &impediments,
    &window,
    &cfg.whitelist,
    cfg.timeline_cap_hours,
    p.timeline_strategy,
    hours,
    p.now,
  );

  tracing::info!(
    sprint = %sprint_id,
    impediments = impediments.len(),
    blocked = metrics.blocked_count,
    unblocked = metrics.unblocked_count,
    "report assembled"
  );

  DashboardReport {
    generated_at: p.now,
    overdue: sprint.as_ref().is_some_and(|s| s.is_overdue(today)),
    sprint_id,
    sprint,
    window: window.info(),
    metrics: metrics.sprint_metrics(),
    daily: metrics.by_day,
    reasons,
    timeline,
    blocked: blocked_rows(&impediments, hours, cfg.critical_ms, p.now),
    unblocked: unblocked_rows(&impediments, hours, p.now),
  }
}
