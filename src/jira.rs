// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read issue-tracker (Jira) issue exports with changelog and materialize extracted intervals as impediment records
// role: adapter/issue-tracker
// inputs: serde_json::Value holding an issue array or a search response ({ "issues": [...] })
// outputs: IssueHistory per issue; Impediment records keyed by composite identity
// side_effects: tracing warnings for issues skipped for missing keys
// invariants:
// - histories are flattened in input order; the extractor handles ordering faults
// - record ids are (key, sprint, start) composites so re-ingestion upserts
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::changelog::{BlockedMatcher, RawChange, extract_raw};
use crate::error::InputError;
use crate::ext::serde_json::JsonFetch;
use crate::model::{Impediment, Interval};
use crate::reason::CanonicalReason;
use crate::util::parse_instant;

pub const SYNC_ACTOR: &str = "jira-sync";

#[derive(Debug, Clone, PartialEq)]
pub struct IssueHistory {
  pub key: String,
  pub title: String,
  pub status: String,
  pub labels: Vec<String>,
  pub description: String,
  pub last_updated: Option<DateTime<Utc>>,
  pub changes: Vec<RawChange>,
}

impl IssueHistory {
  pub fn from_json(issue: &Value) -> Result<Self, InputError> {
    let key = issue.fetch("key").text().ok_or(InputError::MissingField("key"))?;

    let mut changes = Vec::new();
    for history in issue.fetch("changelog.histories").items() {
      let at: String = history.fetch("created").to_or_default();
      for item in history.fetch("items").items() {
        changes.push(change_from_item(item, &at));
      }
    }

    Ok(Self {
      key,
      title: issue.fetch("fields.summary").text().unwrap_or_default(),
      status: issue.fetch("fields.status.name").text().unwrap_or_default(),
      labels: issue.fetch("fields.labels").to_or_default(),
      // rich-text (document) descriptions are not carried over
      description: issue.fetch("fields.description").text().unwrap_or_default(),
      last_updated: issue.fetch("fields.updated").text().and_then(|raw| parse_instant(&raw).ok()),
      changes,
    })
  }

  /// Current state: the status equals the blocked status or the labels carry the blocked label.
  pub fn currently_blocked(&self, matcher: &BlockedMatcher) -> bool {
    self.status.trim().to_lowercase() == matcher.status || matcher.labels_have_blocked(&self.labels)
  }

  pub fn extract_intervals(&self, matcher: &BlockedMatcher, now: DateTime<Utc>) -> Vec<Interval> {
    extract_raw(&self.changes, matcher, self.currently_blocked(matcher), self.last_updated.unwrap_or(now))
  }

  pub fn reason(&self) -> CanonicalReason {
    CanonicalReason::from_labels(&self.labels)
  }

  pub fn browse_link(&self, base_url: Option<&str>) -> Option<String> {
    base_url
      .map(|b| b.trim().trim_end_matches('/').trim_end_matches("/rest/api/3").to_string())
      .filter(|b| !b.is_empty())
      .map(|b| format!("{}/browse/{}", b, self.key))
  }

  /// One record per interval, attributed to the sync actor.
  pub fn to_impediments(&self, intervals: &[Interval], sprint_id: &str, base_url: Option<&str>) -> Vec<Impediment> {
    let reason = self.reason();
    let external_link = self.browse_link(base_url);

    intervals
      .iter()
      .map(|iv| Impediment {
        id: Impediment::composite_id(&self.key, sprint_id, iv.start),
        work_item_id: self.key.clone(),
        work_item_title: self.title.clone(),
        sprint_id: sprint_id.to_string(),
        start: iv.start,
        end: iv.end,
        reason,
        actor: SYNC_ACTOR.to_string(),
        external_link: external_link.clone(),
        description: self.description.clone(),
        responsible: None,
        reopened_from: None,
        reopened_at: None,
      })
      .collect()
  }
}

fn change_from_item(item: &Value, at: &str) -> RawChange {
  let field: String = item.fetch("field").to_or_default();
  let is_labels = field.trim().eq_ignore_ascii_case("labels");

  // status items carry names in fromString/toString; label diffs may only have from/to
  let side = |string_key: &str, raw_key: &str| -> String {
    item
      .fetch(string_key)
      .to::<String>()
      .or_else(|| if is_labels { item.fetch(raw_key).to::<String>() } else { None })
      .unwrap_or_default()
  };

  RawChange { field, from: side("fromString", "from"), to: side("toString", "to"), at: at.to_string() }
}

/// Accept either a bare issue array or a search response object.
pub fn parse_issues(doc: &Value) -> Result<Vec<IssueHistory>, InputError> {
  let issues = match doc {
    Value::Array(items) => items.as_slice(),
    Value::Object(_) => doc.get("issues").and_then(Value::as_array).map(Vec::as_slice).ok_or(InputError::MissingField("issues"))?,
    _ => return Err(InputError::MissingField("issues")),
  };

  Ok(
    issues
      .iter()
      .enumerate()
      .filter_map(|(idx, issue)| match IssueHistory::from_json(issue) {
        Ok(history) => Some(history),
        Err(err) => {
          tracing::warn!(index = idx, error = %err, "skipping issue");
          None
        }
      })
      .collect(),
  )
}
