use anyhow::{Ok, Result};
use predicates::prelude::*;

use crate::CliTest;

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    test.command()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created .msggenrc.json"));

    let config = test.read_file(".msggenrc.json")?;
    let parsed: serde_json::Value = serde_json::from_str(&config)?;
    assert_eq!(parsed["output"]["root"], "./generated");
    assert_eq!(parsed["openapi"]["splitStrategy"], "NONE");
    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".msggenrc.json", "{}")?;

    test.command()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    Ok(())
}
