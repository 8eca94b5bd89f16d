use predicates::prelude::*;

#[test]
fn sprint_start_masks_id_and_end_marks_it_stopped() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");

  let out = crate::cli(&ledger, crate::NOW)
    .args(["sprint", "start", "--id", "sprint 7", "--start-date", "2024-01-08"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let sprint = test_support::stdout_json(&out);
  assert_eq!(sprint["id"], "Sprint-7");
  assert_eq!(sprint["start_date"], "2024-01-08");
  assert_eq!(sprint["end_date"], "2024-01-23");
  assert_eq!(sprint["started"], true);

  let out = crate::cli(&ledger, crate::NOW).args(["sprint", "end"]).output().unwrap();
  assert!(out.status.success());
  assert_eq!(test_support::stdout_json(&out)["started"], false);
  assert_eq!(crate::read_ledger(&ledger)["sprint"]["started"], false);

  // nothing left to end
  crate::cli(&ledger, crate::NOW).args(["sprint", "end"]).assert().failure();
}

#[test]
fn sprint_cannot_start_in_the_future() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");
  crate::cli(&ledger, crate::NOW)
    .args(["sprint", "start", "--id", "8", "--start-date", "2024-02-01"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("2024-02-01"));
  assert!(!ledger.exists());
}

#[test]
fn sprint_days_flag_sets_length() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");
  let out = crate::cli(&ledger, crate::NOW)
    .args(["--sprint-days", "10", "sprint", "start", "--id", "9"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let sprint = test_support::stdout_json(&out);
  assert_eq!(sprint["start_date"], "2024-01-12");
  assert_eq!(sprint["end_date"], "2024-01-22");
}

#[test]
fn oversized_sprint_length_is_a_config_error() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");
  crate::cli(&ledger, crate::NOW)
    .args(["--sprint-days", "100000000", "sprint", "start", "--id", "1"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("sprint length must be between 1 and 366 days"));
  assert!(!ledger.exists());
}
