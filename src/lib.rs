// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Library root for the impediment interval and duration engine and its CLI glue
// role: module/aggregation
// outputs: Public engine modules (reason, clock, changelog, daily, timeline, window, breakdown) and CLI support modules
// invariants: engine modules hold no process-wide state; every call takes its configuration and `now` explicitly
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod breakdown;
pub mod changelog;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod daily;
pub mod error;
pub mod ext;
pub mod jira;
pub mod ledger;
pub mod model;
pub mod reason;
pub mod render;
pub mod timeline;
pub mod util;
pub mod window;
