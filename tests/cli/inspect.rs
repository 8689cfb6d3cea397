use anyhow::{Ok, Result};
use predicates::prelude::*;
use serde_json::{Value, json};

use crate::CliTest;

#[test]
fn test_inspect_prints_canonical_tree() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "CUST_ID", "Customer identifier", 20, "String", "M", "CUSTOMER_ID"])],
        vec![],
        None,
    )?;

    let output = test.inspect_command(&spec).assert().success().get_output().clone();
    let tree: Value = serde_json::from_slice(&output.stdout)?;

    assert_eq!(tree["metadata"]["operationId"], "CreateApplication");
    assert_eq!(tree["metadata"]["parseTimestamp"], crate::TEST_TIMESTAMP);
    assert_eq!(tree["request"][0]["originalName"], "CUST_ID");
    assert_eq!(tree["request"][0]["camelCaseName"], "customerId");
    assert_eq!(tree["request"][0]["segLevel"], 1);
    assert_eq!(tree["request"][0]["isTransitory"], false);
    // Explicit nulls, not omissions
    assert!(tree["request"][0].get("className").unwrap().is_null());
    assert_eq!(tree["response"], json!([]));

    // No filesystem output
    assert!(!test.root().join("generated").exists());
    Ok(())
}

#[test]
fn test_inspect_is_deterministic() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "App:Application", "", null, ""]),
            json!([2, "occurenceCount", "0..5", null, ""]),
            json!([2, "appDate", "", 8, "String"]),
        ],
        vec![],
        None,
    )?;

    let first = test.inspect_command(&spec).assert().success().get_output().stdout.clone();
    let second = test.inspect_command(&spec).assert().success().get_output().stdout.clone();
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_inspect_parse_error() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!(["zero", "broken", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.inspect_command(&spec)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not an integer"));
    Ok(())
}
