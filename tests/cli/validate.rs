use anyhow::{Ok, Result};
use predicates::prelude::*;
use serde_json::json;

use crate::CliTest;

fn generated_project() -> Result<CliTest> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "CUST_ID", "Customer identifier", 20, "String", "M", "CUSTOMER_ID"]),
            json!([1, "CreateApp:CreateApplication", "", null, ""]),
            json!([2, "appDate", "", 8, "String"]),
        ],
        vec![],
        None,
    )?;
    test.generate_command(&spec).assert().success();
    Ok(test)
}

#[test]
fn test_validate_committed_tree_passes() -> Result<()> {
    let test = generated_project()?;

    test.validate_command("generated")
        .assert()
        .success()
        .stdout(predicate::str::contains("no errors"));
    Ok(())
}

#[test]
fn test_validate_detects_tampering() -> Result<()> {
    let test = generated_project()?;

    // Remove a field from the Java class after commit
    let path = "generated/java/com/bank/mq/CreateApplicationRequest.java";
    let java = test.read_file(path)?;
    let tampered: String = java
        .lines()
        .filter(|line| !line.contains("customerId"))
        .collect::<Vec<_>>()
        .join("\n");
    test.write_file(path, &tampered)?;

    test.validate_command("generated")
        .assert()
        .code(6)
        .stdout(predicate::str::contains("missing-field"))
        .stdout(predicate::str::contains("Request/customerId"));
    Ok(())
}

#[test]
fn test_validate_on_missing_tree() -> Result<()> {
    let test = CliTest::with_config()?;

    test.validate_command("generated")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("generated output tree"));
    Ok(())
}

#[test]
fn test_validate_report_files_exist() -> Result<()> {
    let test = generated_project()?;

    let report: serde_json::Value =
        serde_json::from_str(&test.read_output("consistency-report.json")?)?;
    assert_eq!(report["status"], "pass");
    assert_eq!(report["artifacts"], json!(["xml", "java", "openapi"]));

    let summary = test.read_output("consistency-summary.md")?;
    assert!(summary.contains("Status: **pass**"));
    Ok(())
}
