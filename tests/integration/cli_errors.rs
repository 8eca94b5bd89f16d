use predicates::prelude::*;

#[test]
fn missing_subcommand_fails_with_hint() {
  let td = test_support::tempdir();
  crate::cli(&td.path().join("ledger.json"), crate::NOW)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Provide a subcommand"));
}

#[test]
fn inverted_business_hours_are_rejected_before_touching_the_ledger() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");
  crate::cli(&ledger, crate::NOW)
    .args(["--business-start-hour", "18", "--business-end-hour", "9", "report"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid business hours"));
  assert!(!ledger.exists());
}

#[test]
fn unknown_timezone_is_rejected() {
  let td = test_support::tempdir();
  crate::cli(&td.path().join("ledger.json"), crate::NOW)
    .args(["report", "--tz", "Mars/Olympus_Mons"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Mars/Olympus_Mons"));
}

#[test]
fn unknown_impediment_id_fails() {
  let td = test_support::tempdir();
  crate::cli(&td.path().join("ledger.json"), crate::NOW)
    .args(["block", "end", "--id", "PROJ-404-Sprint-1-0"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("PROJ-404-Sprint-1-0"));
}
