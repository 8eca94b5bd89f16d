use jsonschema::validator_for;

fn compile_schema(name: &str) -> jsonschema::Validator {
  let path = test_support::schemas_dir().join(name);
  let data = std::fs::read(&path).expect("schema file");
  let schema: serde_json::Value = serde_json::from_slice(&data).expect("valid schema JSON");
  validator_for(&schema).expect("compile schema")
}

#[test]
fn empty_report_conforms_to_schema() {
  let td = test_support::tempdir();
  let out = crate::cli(&td.path().join("ledger.json"), crate::NOW).arg("report").output().unwrap();
  assert!(out.status.success());

  let report = test_support::stdout_json(&out);
  compile_schema("impediment-report.report.schema.json")
    .validate(&report)
    .expect("schema validation failed for empty report");
}

#[test]
fn populated_report_conforms_to_schema() {
  let td = test_support::tempdir();
  let ledger = td.path().join("ledger.json");
  let issues = test_support::copy_fixture("jira_issues.json", td.path());

  crate::cli(&ledger, crate::NOW)
    .args(["sprint", "start", "--id", "7", "--start-date", "2024-01-08"])
    .assert()
    .success();
  crate::cli(&ledger, crate::NOW).arg("ingest").arg("--issues").arg(&issues).assert().success();
  crate::cli(&ledger, crate::NOW)
    .args(["block", "start", "--item", "PAY-200", "--reason", "falta de especificação", "--responsible", "bruno"])
    .assert()
    .success();

  for extra in [&[][..], &["--wall-clock", "--timeline-strategy", "business"][..]] {
    let out = crate::cli(&ledger, crate::NOW).arg("report").args(extra).output().unwrap();
    assert!(out.status.success());
    let report = test_support::stdout_json(&out);
    assert!(report["sprint"].is_object());
    compile_schema("impediment-report.report.schema.json")
      .validate(&report)
      .expect("schema validation failed for populated report");
  }
}
