// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Reconstruct blocked intervals from an ordered field-change history
// role: engine/extraction
// inputs: RawChange list (field, from, to, at), current blocked state, last-known change instant
// outputs: Interval list (closed intervals in order, at most one trailing open interval)
// side_effects: tracing events for skipped or synthesized entries
// invariants:
// - a single active-start cursor; at most one open interval per run
// - blocked->blocked and unblocked->unblocked transitions are no-ops
// - malformed or out-of-order events are skipped individually; extraction never fails
// - a blocked item whose history never opened an interval gets one synthesized at the last-known change
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::InputError;
use crate::model::Interval;
use crate::util::parse_instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
  Status,
  Labels,
}

impl FromStr for ChangeKind {
  type Err = InputError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "status" => Ok(ChangeKind::Status),
      "labels" => Ok(ChangeKind::Labels),
      other => Err(InputError::UnknownField(other.to_string())),
    }
  }
}

/// A change record as it arrives from the tracker, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChange {
  pub field: String,
  #[serde(default)]
  pub from: String,
  #[serde(default)]
  pub to: String,
  pub at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeEvent {
  pub kind: ChangeKind,
  pub from: String,
  pub to: String,
  pub at: DateTime<Utc>,
}

impl StatusChangeEvent {
  pub fn parse(raw: &RawChange) -> Result<Self, InputError> {
    let kind: ChangeKind = raw.field.parse()?;
    let at = parse_instant(&raw.at)?;

    Ok(Self { kind, from: raw.from.clone(), to: raw.to.clone(), at })
  }
}

/// Tokens that mark a work item as blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedMatcher {
  /// Status name matched exactly (case-insensitive).
  pub status: String,
  /// Substring that also marks a status as blocked; empty disables it.
  pub synonym: String,
  /// Label token searched for in label diffs.
  pub label: String,
}

impl Default for BlockedMatcher {
  fn default() -> Self {
    Self { status: "blocked".into(), synonym: "impedido".into(), label: "blocked".into() }
  }
}

impl BlockedMatcher {
  pub fn status_is_blocked(&self, status: &str) -> bool {
    let s = status.trim().to_lowercase();
    s == self.status || (!self.synonym.is_empty() && s.contains(&self.synonym))
  }

  pub fn diff_has_label(&self, diff: &str) -> bool {
    diff.to_lowercase().contains(&self.label)
  }

  pub fn labels_have_blocked(&self, labels: &[String]) -> bool {
    labels.iter().any(|l| l.trim().to_lowercase() == self.label)
  }

  /// Whether this event leaves the item blocked, and whether it was blocked before.
  fn transition(&self, event: &StatusChangeEvent) -> (bool, bool) {
    match event.kind {
      ChangeKind::Status => (self.status_is_blocked(&event.from), self.status_is_blocked(&event.to)),
      ChangeKind::Labels => (self.diff_has_label(&event.from), self.diff_has_label(&event.to)),
    }
  }
}

/// Replay validated events into intervals.
pub fn extract(
  events: &[StatusChangeEvent],
  matcher: &BlockedMatcher,
  currently_blocked: bool,
  last_known_change_at: DateTime<Utc>,
) -> Vec<Interval> {
  let mut intervals: Vec<Interval> = Vec::new();
  let mut active: Option<DateTime<Utc>> = None;
  let mut opened_any = false;
  let mut last_seen: Option<DateTime<Utc>> = None;

  for event in events {
    if let Some(prev) = last_seen {
      if event.at < prev {
        tracing::warn!(at = %event.at, previous = %prev, "skipping out-of-order change event");
        continue;
      }
    }
    last_seen = Some(event.at);

    let (was_blocked, now_blocked) = matcher.transition(event);

    match active {
      None if now_blocked => {
        active = Some(event.at);
        opened_any = true;
      }
      Some(start) if was_blocked && !now_blocked => {
        intervals.push(Interval { start, end: Some(event.at) });
        active = None;
      }
      _ => {}
    }
  }

  match active {
    Some(start) if currently_blocked => intervals.push(Interval::open(start)),
    Some(start) => {
      tracing::debug!(start = %start, "history ends blocked but item is not blocked now; dropping open cursor");
    }
    None if currently_blocked && !opened_any => {
      tracing::debug!(at = %last_known_change_at, "blocked item without usable history; synthesizing an open interval");
      intervals.push(Interval::open(last_known_change_at));
    }
    None => {}
  }

  intervals
}

/// Validate raw changes one by one, skipping the bad ones, then replay them.
pub fn extract_raw(
  changes: &[RawChange],
  matcher: &BlockedMatcher,
  currently_blocked: bool,
  last_known_change_at: DateTime<Utc>,
) -> Vec<Interval> {
  let events: Vec<StatusChangeEvent> = changes
    .iter()
    .filter_map(|raw| match StatusChangeEvent::parse(raw) {
      Ok(event) => Some(event),
      Err(InputError::UnknownField(field)) => {
        tracing::trace!(field = %field, "ignoring change to an untracked field");
        None
      }
      Err(err) => {
        tracing::warn!(error = %err, field = %raw.field, "skipping malformed change event");
        None
      }
    })
    .collect();

  extract(&events, matcher, currently_blocked, last_known_change_at)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn t(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, h, 0, 0).single().unwrap()
  }

  fn status(from: &str, to: &str, at: DateTime<Utc>) -> StatusChangeEvent {
    StatusChangeEvent { kind: ChangeKind::Status, from: from.into(), to: to.into(), at }
  }

  fn labels(from: &str, to: &str, at: DateTime<Utc>) -> StatusChangeEvent {
    StatusChangeEvent { kind: ChangeKind::Labels, from: from.into(), to: to.into(), at }
  }

  fn raw(field: &str, from: &str, to: &str, at: &str) -> RawChange {
    RawChange { field: field.into(), from: from.into(), to: to.into(), at: at.into() }
  }

  #[test]
  fn single_block_and_unblock_yields_one_closed_interval() {
    let events = vec![status("In Progress", "Blocked", t(10)), status("Blocked", "In Progress", t(14))];
    let out = extract(&events, &BlockedMatcher::default(), false, t(14));
    assert_eq!(out, vec![Interval { start: t(10), end: Some(t(14)) }]);
  }

  #[test]
  fn unclosed_block_on_blocked_item_stays_open() {
    let events = vec![status("To Do", "Blocked", t(10))];
    let out = extract(&events, &BlockedMatcher::default(), true, t(10));
    assert_eq!(out, vec![Interval::open(t(10))]);
  }

  #[test]
  fn synonym_counts_as_blocked() {
    let events = vec![status("Doing", "Impedido pelo cliente", t(9)), status("Impedido pelo cliente", "Doing", t(11))];
    let out = extract(&events, &BlockedMatcher::default(), false, t(11));
    assert_eq!(out.len(), 1);
  }

  #[test]
  fn repeated_blocked_transitions_are_noops() {
    let events = vec![
      status("To Do", "Blocked", t(9)),
      status("Blocked", "Blocked", t(10)),
      status("Blocked", "Done", t(12)),
      status("Done", "Closed", t(13)),
    ];
    let out = extract(&events, &BlockedMatcher::default(), false, t(13));
    assert_eq!(out, vec![Interval { start: t(9), end: Some(t(12)) }]);
  }

  #[test]
  fn label_diff_opens_and_closes() {
    let events = vec![labels("frontend", "frontend blocked", t(9)), labels("frontend blocked", "frontend", t(15))];
    let out = extract(&events, &BlockedMatcher::default(), false, t(15));
    assert_eq!(out, vec![Interval { start: t(9), end: Some(t(15)) }]);
  }

  #[test]
  fn label_kept_on_both_sides_does_not_close() {
    let events = vec![labels("", "blocked", t(9)), labels("blocked", "blocked urgent", t(10))];
    let out = extract(&events, &BlockedMatcher::default(), true, t(10));
    assert_eq!(out, vec![Interval::open(t(9))]);
  }

  #[test]
  fn unblocking_without_active_cursor_is_ignored() {
    let events = vec![status("Blocked", "Done", t(9))];
    let out = extract(&events, &BlockedMatcher::default(), false, t(9));
    assert!(out.is_empty());
  }

  #[test]
  fn blocked_item_without_history_is_synthesized() {
    let out = extract(&[], &BlockedMatcher::default(), true, t(8));
    assert_eq!(out, vec![Interval::open(t(8))]);
  }

  #[test]
  fn blocked_item_with_closed_history_is_not_synthesized() {
    let events = vec![status("To Do", "Blocked", t(9)), status("Blocked", "To Do", t(10))];
    let out = extract(&events, &BlockedMatcher::default(), true, t(12));
    assert_eq!(out, vec![Interval { start: t(9), end: Some(t(10)) }]);
  }

  #[test]
  fn blocked_item_with_only_irrelevant_history_is_synthesized() {
    let events = vec![status("To Do", "In Progress", t(9))];
    let out = extract(&events, &BlockedMatcher::default(), true, t(12));
    assert_eq!(out, vec![Interval::open(t(12))]);
  }

  #[test]
  fn out_of_order_events_are_skipped() {
    let events = vec![
      status("To Do", "Blocked", t(10)),
      status("Blocked", "To Do", t(8)),
      status("Blocked", "To Do", t(12)),
    ];
    let out = extract(&events, &BlockedMatcher::default(), false, t(12));
    assert_eq!(out, vec![Interval { start: t(10), end: Some(t(12)) }]);
  }

  #[test]
  fn raw_changes_skip_bad_timestamps_and_unknown_fields() {
    let changes = vec![
      raw("assignee", "", "alice", "2024-01-10T08:00:00.000+0000"),
      raw("status", "To Do", "Blocked", "2024-01-10T09:00:00.000+0000"),
      raw("status", "Blocked", "To Do", "not a date"),
      raw("Status", "Blocked", "To Do", "2024-01-10T11:00:00Z"),
    ];
    let out = extract_raw(&changes, &BlockedMatcher::default(), false, t(11));
    assert_eq!(out, vec![Interval { start: t(9), end: Some(t(11)) }]);
  }

  #[test]
  fn change_kind_parse_rejects_unknown() {
    assert_eq!("LABELS".parse::<ChangeKind>().unwrap(), ChangeKind::Labels);
    assert!(matches!("priority".parse::<ChangeKind>(), Err(InputError::UnknownField(_))));
  }
}
