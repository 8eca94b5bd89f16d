use predicates::prelude::*;

#[test]
fn gen_man_outputs_troff() {
  test_support::init_tracing();
  let mut cmd = test_support::cmd_bin(crate::BIN);
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  assert!(text.starts_with(".TH"), "expected troff man header");
  assert!(text.contains("impediment-report"));
}

#[test]
fn help_lists_subcommands() {
  test_support::cmd_bin(crate::BIN)
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("sprint").and(predicate::str::contains("ingest")).and(predicate::str::contains("report")));
}
