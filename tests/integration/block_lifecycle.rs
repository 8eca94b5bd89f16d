use predicates::prelude::*;

#[test]
fn start_end_and_reopen_an_impediment() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");

  let out = crate::cli(&ledger, "2024-01-10T09:00:00Z")
    .args([
      "block",
      "start",
      "--item",
      "PAY-7",
      "--title",
      "Settlement file",
      "--reason",
      "Dependência externa",
      "--responsible",
      "ana",
      "--sprint-id",
      "Sprint-7",
    ])
    .output()
    .unwrap();
  assert!(out.status.success());
  let started = test_support::stdout_json(&out);
  let id = started["id"].as_str().unwrap().to_string();
  assert!(id.starts_with("PAY-7-Sprint-7-"));
  assert_eq!(started["reason"], "External Dependency");
  assert!(started["end"].is_null());

  let out = crate::cli(&ledger, "2024-01-10T12:00:00Z").args(["block", "end", "--id", &id]).output().unwrap();
  assert!(out.status.success());
  assert_eq!(test_support::stdout_json(&out)["end"], "2024-01-10T12:00:00Z");

  crate::cli(&ledger, "2024-01-10T13:00:00Z")
    .args(["block", "end", "--id", &id])
    .assert()
    .failure()
    .stderr(predicate::str::contains("already closed"));

  let out = crate::cli(&ledger, "2024-01-11T10:00:00Z")
    .args(["block", "reopen", "--id", &id, "--description", "partner rolled back"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let reopened = test_support::stdout_json(&out);
  assert_eq!(reopened["reopened_from"], id.as_str());
  assert_eq!(reopened["sprint_id"], "Sprint-7");
  assert_eq!(reopened["responsible"], "ana");
  assert_eq!(reopened["description"], "partner rolled back");

  let stored = crate::read_ledger(&ledger);
  assert_eq!(stored["impediments"].as_array().unwrap().len(), 2);
}

#[test]
fn reopen_of_open_record_fails() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");

  let out = crate::cli(&ledger, "2024-01-10T09:00:00Z")
    .args(["block", "start", "--item", "PAY-8", "--reason", "bug", "--sprint-id", "Sprint-7"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let id = test_support::stdout_json(&out)["id"].as_str().unwrap().to_string();

  crate::cli(&ledger, "2024-01-10T10:00:00Z")
    .args(["block", "reopen", "--id", &id])
    .assert()
    .failure()
    .stderr(predicate::str::contains("still open"));
}
