// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Normalize free-text reasons and issue labels into the fixed blocking-cause enumeration
// role: model/canonicalization
// inputs: Raw reason strings; issue label lists
// outputs: CanonicalReason (total; unknown input maps to Other)
// invariants:
// - canonicalize is pure, total, deterministic and case-insensitive
// - keyword triggers are checked in a fixed priority order; the first match wins
// - serde round-trips through the display label and the canonicalizer
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalReason {
  Environment,
  InternalBug,
  ExternalDependency,
  Getnet,
  Occ,
  MissingSpecification,
  Other,
}

/// Substring triggers for `canonicalize`, in priority order.
const KEYWORD_TRIGGERS: &[(&str, CanonicalReason)] = &[
  ("ambiente", CanonicalReason::Environment),
  ("environment", CanonicalReason::Environment),
  ("depend", CanonicalReason::ExternalDependency),
  ("bug", CanonicalReason::InternalBug),
  ("getnet", CanonicalReason::Getnet),
  ("occ", CanonicalReason::Occ),
  ("specifi", CanonicalReason::MissingSpecification),
];

/// Exact label matches for `from_labels`, in priority order.
const LABEL_TRIGGERS: &[(&[&str], CanonicalReason)] = &[
  (&["getnet"], CanonicalReason::Getnet),
  (&["occ"], CanonicalReason::Occ),
  (&["ambiente"], CanonicalReason::Environment),
  (&["bug", "bug-interno"], CanonicalReason::InternalBug),
  (
    &["dep-externa", "dependencia", "dependência externa"],
    CanonicalReason::ExternalDependency,
  ),
  (
    &["falta-especificacao", "falta de especificação"],
    CanonicalReason::MissingSpecification,
  ),
];

impl CanonicalReason {
  pub const ALL: [CanonicalReason; 7] = [
    CanonicalReason::Environment,
    CanonicalReason::InternalBug,
    CanonicalReason::ExternalDependency,
    CanonicalReason::Getnet,
    CanonicalReason::Occ,
    CanonicalReason::MissingSpecification,
    CanonicalReason::Other,
  ];

  /// Reasons charted by default, in display order. `Other` is left out.
  pub const DEFAULT_WHITELIST: [CanonicalReason; 6] = [
    CanonicalReason::Environment,
    CanonicalReason::InternalBug,
    CanonicalReason::ExternalDependency,
    CanonicalReason::MissingSpecification,
    CanonicalReason::Getnet,
    CanonicalReason::Occ,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      CanonicalReason::Environment => "Environment",
      CanonicalReason::InternalBug => "Internal Bug",
      CanonicalReason::ExternalDependency => "External Dependency",
      CanonicalReason::Getnet => "Getnet",
      CanonicalReason::Occ => "OCC",
      CanonicalReason::MissingSpecification => "Missing Specification",
      CanonicalReason::Other => "Other",
    }
  }

  /// Map an issue's label list to a reason by exact, case-insensitive membership.
  pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> CanonicalReason {
    let lowered: Vec<String> = labels.iter().map(|l| l.as_ref().trim().to_lowercase()).collect();

    LABEL_TRIGGERS
      .iter()
      .find(|(tokens, _)| tokens.iter().any(|t| lowered.iter().any(|l| l == t)))
      .map(|(_, reason)| *reason)
      .unwrap_or(CanonicalReason::Other)
  }
}

/// Normalize a free-text reason. Empty or unmatched input yields `Other`.
pub fn canonicalize(raw: &str) -> CanonicalReason {
  let s = raw.trim().to_lowercase();

  if s.is_empty() {
    return CanonicalReason::Other;
  }

  KEYWORD_TRIGGERS
    .iter()
    .find(|(needle, _)| s.contains(needle))
    .map(|(_, reason)| *reason)
    .unwrap_or(CanonicalReason::Other)
}

impl fmt::Display for CanonicalReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl From<&str> for CanonicalReason {
  fn from(raw: &str) -> Self {
    canonicalize(raw)
  }
}

impl Serialize for CanonicalReason {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.label())
  }
}

impl<'de> Deserialize<'de> for CanonicalReason {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(canonicalize(raw.as_deref().unwrap_or("")))
  }
}
