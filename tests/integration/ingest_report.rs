use predicates::prelude::*;

fn start_sprint(ledger: &std::path::Path) {
  crate::cli(ledger, crate::NOW)
    .args(["sprint", "start", "--id", "7", "--start-date", "2024-01-08"])
    .assert()
    .success();
}

#[test]
fn ingest_is_idempotent_and_files_under_active_sprint() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");
  let issues = test_support::copy_fixture("jira_issues.json", td.path());
  start_sprint(&ledger);

  let out = crate::cli(&ledger, crate::NOW)
    .args(["ingest", "--base-url", "https://acme.atlassian.net/"])
    .arg("--issues")
    .arg(&issues)
    .output()
    .unwrap();
  assert!(out.status.success());
  let first = test_support::stdout_json(&out);
  let export: serde_json::Value = test_support::read_fixture_json("jira_issues.json");
  let keyed = export["issues"].as_array().unwrap().iter().filter(|i| i.get("key").is_some()).count();
  assert_eq!(first["sprint_id"], "Sprint-7");
  // the keyless row is skipped
  assert_eq!(first["issues"], keyed as u64);
  assert_eq!(keyed, 3);
  assert_eq!(first["intervals"], 3);
  assert_eq!(first["inserted"], 3);

  let out = crate::cli(&ledger, crate::NOW).arg("ingest").arg("--issues").arg(&issues).output().unwrap();
  assert!(out.status.success());
  let second = test_support::stdout_json(&out);
  assert_eq!(second["inserted"], 0);
  assert_eq!(second["updated"], 3);

  let stored = crate::read_ledger(&ledger);
  let records = stored["impediments"].as_array().unwrap();
  assert_eq!(records.len(), 3);
  assert!(records.iter().all(|r| r["actor"] == "jira-sync" && r["sprint_id"] == "Sprint-7"));
  assert!(records.iter().any(|r| r["external_link"] == "https://acme.atlassian.net/browse/PAY-101"));
}

#[test]
fn ingest_missing_file_reports_path() {
  let td = test_support::tempdir();
  crate::cli(&td.path().join("ledger.json"), crate::NOW)
    .args(["ingest", "--issues", "does-not-exist.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("does-not-exist.json"));
}

#[test]
fn report_summarizes_ingested_sprint() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");
  let issues = test_support::copy_fixture("jira_issues.json", td.path());
  start_sprint(&ledger);
  crate::cli(&ledger, crate::NOW).arg("ingest").arg("--issues").arg(&issues).assert().success();

  let out = crate::cli(&ledger, crate::NOW).arg("report").output().unwrap();
  assert!(out.status.success());
  let report = test_support::stdout_json(&out);

  assert_eq!(report["sprint_id"], "Sprint-7");
  assert_eq!(report["overdue"], false);
  assert_eq!(report["window"]["start_date"], "2024-01-08");
  assert_eq!(report["window"]["labels"].as_array().unwrap().len(), 16);
  assert_eq!(report["metrics"]["blocked_count"], 1);
  assert_eq!(report["metrics"]["unblocked_count"], 1);

  let blocked = report["blocked"].as_array().unwrap();
  assert_eq!(blocked.len(), 1);
  assert_eq!(blocked[0]["work_item_id"], "PAY-101");
  assert_eq!(blocked[0]["reason"], "Getnet");
  // Jan 11 and Jan 12, nine business hours each
  assert_eq!(blocked[0]["duration_ms"], 18 * 3_600_000_i64);
  assert_eq!(blocked[0]["critical"], true);

  let unblocked = report["unblocked"].as_array().unwrap();
  assert_eq!(unblocked.len(), 2);
  // most recently ended first
  assert_eq!(unblocked[0]["work_item_id"], "PAY-102");
  assert_eq!(unblocked[0]["reason"], "Environment");
  assert_eq!(unblocked[1]["work_item_id"], "PAY-101");
}

#[test]
fn report_writes_to_out_file() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");
  let out_path = td.path().join("reports").join("sprint.json");

  crate::cli(&ledger, crate::NOW)
    .args(["report", "--sprint-id", "Sprint-1", "--wall-clock", "--out"])
    .arg(&out_path)
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let report: serde_json::Value = serde_json::from_slice(&std::fs::read(&out_path).unwrap()).unwrap();
  assert_eq!(report["sprint_id"], "Sprint-1");
  assert_eq!(report["reasons"]["strategy"], "wall_clock");
  assert!(report.get("sprint").is_none());
}
