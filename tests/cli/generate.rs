use anyhow::{Ok, Result};
use predicates::prelude::*;
use serde_json::{Value, json};

use crate::CliTest;

// ============================================================
// Minimal request (single primitive)
// ============================================================

#[test]
fn test_minimal_request() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "CUST_ID", "Customer identifier", 20, "String", "M", "CUSTOMER_ID"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let xml = test.read_output("xml/outbound-converter.xml")?;
    assert!(xml.contains(
        "<field name=\"customerId\" type=\"DataField\" length=\"20\" nullPad=\" \" converter=\"stringFieldConverter\"/>"
    ));

    let java = test.read_output("java/com/bank/mq/CreateApplicationRequest.java")?;
    assert!(java.contains("private String customerId;"));

    let api: Value = serde_yaml::from_str(&test.read_output("openapi/api.yaml")?)?;
    let schema = &api["components"]["schemas"]["CreateApplicationRequest"];
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["customerId"]["type"], "string");
    assert_eq!(schema["properties"]["customerId"]["maxLength"], 20);
    assert_eq!(schema["required"][0], "customerId");

    // The manifest lists exactly the committed files (minus itself)
    let manifest: Value = serde_json::from_str(&test.read_output("manifest.json")?)?;
    let listed: Vec<&str> = manifest["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert!(listed.contains(&"json/spec-tree.json"));
    assert!(listed.contains(&"diff.md"));
    assert!(listed.contains(&"xml/outbound-converter.xml"));
    assert!(listed.contains(&"audit/audit-log.json"));
    assert!(!listed.contains(&"manifest.json"));

    Ok(())
}

// ============================================================
// Transitory group + occurrence markers
// ============================================================

#[test]
fn test_transitory_group_and_occurrence() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "CreateApp:CreateApplication", "", null, ""]),
            json!([2, "groupId", "CREATEAPP", null, ""]),
            json!([2, "occurenceCount", "1..1", null, ""]),
            json!([2, "appDate", "Application date", 8, "String"]),
        ],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let xml = test.read_output("xml/outbound-converter.xml")?;
    assert!(xml.contains(
        "<field type=\"DataField\" length=\"10\" fixedLength=\"true\" transitory=\"true\" defaultValue=\"CREATEAPP\" converter=\"stringFieldConverter\"/>"
    ));
    assert!(xml.contains("converter=\"counterFieldConverter\""));
    assert!(xml.contains(
        "<field name=\"createApp\" type=\"CompositeField\" forType=\"com.bank.mq.CreateApplication\">"
    ));

    // The class carries only the data field
    let java = test.read_output("java/com/bank/mq/CreateApplication.java")?;
    assert!(java.contains("private String appDate;"));
    assert!(!java.contains("groupId"));

    let api: Value = serde_yaml::from_str(&test.read_output("openapi/api.yaml")?)?;
    let schema = &api["components"]["schemas"]["CreateApplication"];
    let keys: Vec<&str> = schema["properties"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["appDate"]);

    Ok(())
}

// ============================================================
// Arrays
// ============================================================

#[test]
fn test_array_container() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "CbaCardArr:CBACardArray", "", null, ""]),
            json!([2, "occurenceCount", "0..9", null, ""]),
            json!([2, "cardNo", "Card number", 16, "String"]),
            json!([2, "cardKind", "Card kind", 2, "String"]),
        ],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let xml = test.read_output("xml/outbound-converter.xml")?;
    assert!(xml.contains(
        "<field name=\"cbaCardArr\" type=\"RepeatingField\" fixedCount=\"9\" forType=\"com.bank.mq.CBACardArray\">"
    ));

    let api: Value = serde_yaml::from_str(&test.read_output("openapi/api.yaml")?)?;
    let field =
        &api["components"]["schemas"]["CreateApplicationRequest"]["properties"]["cbaCardArr"];
    assert_eq!(field["type"], "array");
    assert_eq!(field["items"]["$ref"], "#/components/schemas/CBACardArray");
    assert_eq!(field["maxItems"], 9);

    let element = test.read_output("java/com/bank/mq/CBACardArray.java")?;
    assert!(element.contains("private String cardNo;"));
    assert!(element.contains("private String cardKind;"));

    let parent = test.read_output("java/com/bank/mq/CreateApplicationRequest.java")?;
    assert!(parent.contains("private List<CBACardArray> cbaCardArr = new ArrayList<>();"));

    Ok(())
}

#[test]
fn test_unbounded_occurrence_omits_max_items() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "Items:ItemArray", "", null, ""]),
            json!([2, "occurenceCount", "0..N", null, ""]),
            json!([2, "sku", "", 10, "String"]),
        ],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let api = test.read_output("openapi/api.yaml")?;
    assert!(!api.contains("maxItems"));
    let xml = test.read_output("xml/outbound-converter.xml")?;
    assert!(!xml.contains("fixedCount"));

    Ok(())
}

#[test]
fn test_zero_or_one_occurrence_stays_object() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "App:Application", "", null, ""]),
            json!([2, "occurenceCount", "0..1", null, ""]),
            json!([2, "appDate", "", 8, "String"]),
        ],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let xml = test.read_output("xml/outbound-converter.xml")?;
    assert!(xml.contains("type=\"CompositeField\""));
    assert!(!xml.contains("RepeatingField"));

    Ok(())
}

// ============================================================
// Enumerations
// ============================================================

#[test]
fn test_enum_class() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "cardType", "Card type", 2, "String", "M", null, "01|02|03"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let java = test.read_output("java/com/bank/mq/CardType.java")?;
    assert!(java.contains("public enum CardType {"));
    assert!(java.contains("VALUE_01(\"01\", \"01\"),"));
    assert!(java.contains("VALUE_02(\"02\", \"02\"),"));
    assert!(java.contains("VALUE_03(\"03\", \"03\");"));
    assert!(java.contains("public static CardType fromCode(String code)"));
    assert!(java.contains("public static boolean isValid(String code)"));

    Ok(())
}

// ============================================================
// CJK identifiers and the rename document
// ============================================================

#[test]
fn test_cjk_identifier_in_rename_doc() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "客户姓名", "Customer name", 30, "String", "O"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let diff = test.read_output("diff.md")?;
    assert!(diff.contains("| 客户姓名 | keHuXingMing | Request | 9 |"));
    assert!(diff.contains("- Parsed: 2024-01-02T03:04:05Z"));

    let java = test.read_output("java/com/bank/mq/CreateApplicationRequest.java")?;
    assert!(java.contains("private String keHuXingMing;"));

    Ok(())
}

// ============================================================
// Failure paths
// ============================================================

#[test]
fn test_duplicate_sibling_rejected() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "accountNumber", "", 10, "String"]),
            json!([1, "accountNumber", "", 10, "String"]),
        ],
        vec![],
        None,
    )?;

    test.generate_command(&spec)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("duplicate field name 'accountNumber'"))
        .stderr(predicate::str::contains("sheet Request, row 10"));

    assert!(!test.root().join("generated").exists());
    Ok(())
}

#[test]
fn test_level_gap_rejected() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "App:Application", "", null, ""]),
            json!([3, "deep", "", 1, "String"]),
        ],
        vec![],
        None,
    )?;

    test.generate_command(&spec)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("jumps from 1 to 3"));
    Ok(())
}

#[test]
fn test_empty_request_fails_without_output() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook("spec.json", vec![], vec![], None)?;

    test.generate_command(&spec)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("request has no fields"));

    assert!(!test.root().join("generated").exists());
    // No staging residue either
    let residue = std::fs::read_dir(test.root())?
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .starts_with(".tmp-")
        })
        .count();
    assert_eq!(residue, 0);
    Ok(())
}

#[test]
fn test_missing_config_keys() -> Result<()> {
    let test = CliTest::new()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("xml.namespace.outbound"));
    Ok(())
}

#[test]
fn test_missing_spec_file() -> Result<()> {
    let test = CliTest::with_config()?;
    test.generate_command("nope.json")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("cannot read workbook"));
    Ok(())
}

// ============================================================
// Empty response boundary
// ============================================================

#[test]
fn test_empty_response_commits_envelope_only() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let inbound = test.read_output("xml/inbound-converter.xml")?;
    assert!(inbound.contains(
        "<fix-length-inbound-converter id=\"resp_converter\" codeGen=\"true\"/>"
    ));
    assert!(!inbound.contains("<message"));
    assert!(!test.output_exists("java/com/bank/mq/CreateApplicationResponse.java"));
    let api = test.read_output("openapi/api.yaml")?;
    assert!(!api.contains("CreateApplicationResponse"));

    Ok(())
}

// ============================================================
// Split schemas
// ============================================================

#[test]
fn test_split_by_object() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "CreateApp:CreateApplication", "", null, ""]),
            json!([2, "appDate", "", 8, "String"]),
        ],
        vec![],
        None,
    )?;

    test.generate_command(&spec)
        .arg("--split-strategy")
        .arg("by-object")
        .assert()
        .success();

    let api = test.read_output("openapi/api.yaml")?;
    assert!(!api.contains("components"));
    assert!(api.contains(
        "$ref: './schemas/CreateApplicationRequest.yaml#/CreateApplicationRequest'"
    ));

    let split = test.read_output("openapi/schemas/CreateApplicationRequest.yaml")?;
    assert!(split.starts_with("CreateApplicationRequest:"));
    assert!(split.contains("$ref: './CreateApplication.yaml#/CreateApplication'"));

    assert!(test.output_exists("openapi/schemas/CreateApplication.yaml"));
    Ok(())
}

#[test]
fn test_no_split_directory_without_strategy() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();
    assert!(!test.output_exists("openapi/schemas"));
    Ok(())
}

// ============================================================
// Shared header
// ============================================================

#[test]
fn test_shared_header_artifacts() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        Some(vec![json!([1, "msgId", "Message id", 20, "String", "M"])]),
    )?;

    test.generate_command(&spec).assert().success();

    let shared = test.read_output("java/com/bank/mq/SharedHeader.java")?;
    assert!(shared.contains("private String msgId;"));

    let api: Value = serde_yaml::from_str(&test.read_output("openapi/api.yaml")?)?;
    assert_eq!(
        api["components"]["schemas"]["SharedHeader"]["properties"]["msgId"]["maxLength"],
        20
    );

    let diff = test.read_output("diff.md")?;
    assert!(diff.contains("## Shared Header"));

    Ok(())
}

// ============================================================
// Determinism and replacement
// ============================================================

#[test]
fn test_two_runs_are_byte_identical() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![
            json!([1, "CUST_ID", "Customer identifier", 20, "String", "M", "CUSTOMER_ID"]),
            json!([1, "CreateApp:CreateApplication", "", null, ""]),
            json!([2, "groupId", "CREATEAPP", null, ""]),
            json!([2, "appDate", "", 8, "String"]),
        ],
        vec![json!([1, "resultCode", "", 4, "String", "M"])],
        None,
    )?;

    test.generate_command(&spec).assert().success();
    let first: Vec<(String, String)> = [
        "json/spec-tree.json",
        "xml/outbound-converter.xml",
        "xml/inbound-converter.xml",
        "java/com/bank/mq/CreateApplicationRequest.java",
        "openapi/api.yaml",
        "diff.md",
    ]
    .iter()
    .map(|p| (p.to_string(), test.read_output(p).unwrap()))
    .collect();

    test.generate_command(&spec).assert().success();
    for (path, content) in first {
        assert_eq!(test.read_output(&path)?, content, "{} changed", path);
    }

    // Manifests agree on everything except the transaction id
    let manifest: Value = serde_json::from_str(&test.read_output("manifest.json")?)?;
    assert_eq!(manifest["generatedAt"], crate::TEST_TIMESTAMP);

    Ok(())
}

#[test]
fn test_second_run_replaces_output() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();
    test.write_file("generated/stale.txt", "left over")?;

    test.generate_command(&spec).assert().success();
    assert!(!test.output_exists("stale.txt"));
    assert!(test.output_exists("json/spec-tree.json"));

    // Backup was not kept by default
    let backups = std::fs::read_dir(test.root())?
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .contains(".bak-")
        })
        .count();
    assert_eq!(backups, 0);
    Ok(())
}

#[test]
fn test_keep_backup_flag() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();
    test.generate_command(&spec).arg("--keep-backup").assert().success();

    let backups = std::fs::read_dir(test.root())?
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .contains(".bak-")
        })
        .count();
    assert_eq!(backups, 1);
    Ok(())
}

#[test]
fn test_orphan_staging_directories_reaped() -> Result<()> {
    let test = CliTest::with_config()?;
    std::fs::create_dir_all(test.root().join(".tmp-leftover"))?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();
    assert!(!test.root().join(".tmp-leftover").exists());
    Ok(())
}

#[test]
fn test_relative_spec_path_is_recorded_absolute() -> Result<()> {
    let test = CliTest::with_config()?;
    // The harness always passes the workbook as a path relative to the
    // project directory
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let tree: Value = serde_json::from_str(&test.read_output("json/spec-tree.json")?)?;
    let source = tree["metadata"]["sourceFile"].as_str().unwrap();
    assert!(
        std::path::Path::new(source).is_absolute(),
        "sourceFile is not absolute: {}",
        source
    );
    assert_eq!(
        source,
        test.root().join("spec.json").display().to_string()
    );

    let diff = test.read_output("diff.md")?;
    let source_line = diff
        .lines()
        .find(|line| line.starts_with("- Source:"))
        .expect("diff.md has a Source line");
    let reported = source_line.trim_start_matches("- Source:").trim();
    assert!(std::path::Path::new(reported).is_absolute());
    assert!(reported.ends_with("spec.json"));

    Ok(())
}

// ============================================================
// Strict mode
// ============================================================

#[test]
fn test_strict_mode_fails_on_required_unknown() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String", "M"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec)
        .arg("--strict")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("validation error"));

    assert!(!test.root().join("generated").exists());
    Ok(())
}

// ============================================================
// Audit log
// ============================================================

#[test]
fn test_audit_log_records_run() -> Result<()> {
    let test = CliTest::with_config()?;
    let spec = test.write_workbook(
        "spec.json",
        vec![json!([1, "a", "", 1, "String"])],
        vec![],
        None,
    )?;

    test.generate_command(&spec).assert().success();

    let audit: Value = serde_json::from_str(&test.read_output("audit/audit-log.json")?)?;
    let kinds: Vec<&str> = audit["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "tool_started",
            "input_loaded",
            "parse_started",
            "parse_completed",
            "transaction_started",
            "generation_started",
            "generation_completed",
            "validation_result",
            "manifest_generated",
        ]
    );

    let text = test.read_output("audit/audit-log.txt")?;
    assert!(text.lines().count() == kinds.len());
    assert!(text.contains("tool_started"));

    Ok(())
}
