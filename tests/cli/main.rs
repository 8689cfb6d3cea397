use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

mod generate;
mod init;
mod inspect;
mod validate;

const BIN_NAME: &str = "msggen";

/// Pinned clock for reproducible artifacts.
pub const TEST_TIMESTAMP: &str = "2024-01-02T03:04:05Z";

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// A project with the standard configuration file in place.
    pub fn with_config() -> Result<Self> {
        let test = Self::new()?;
        test.write_file(
            ".msggenrc.json",
            r#"{
  "xml": {
    "namespace": {
      "outbound": "urn:bank:fixlen:outbound",
      "inbound": "urn:bank:fixlen:inbound"
    },
    "project": {
      "groupId": "com.bank",
      "artifactId": "mq-converter"
    }
  },
  "classGen": {
    "package": "com.bank.mq"
  }
}"#,
        )?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    /// Write a JSON-grid workbook with the standard metadata cells and
    /// header row on each sheet.
    pub fn write_workbook(
        &self,
        name: &str,
        request_rows: Vec<Value>,
        response_rows: Vec<Value>,
        shared_rows: Option<Vec<Value>>,
    ) -> Result<String> {
        let mut sheets = serde_json::Map::new();
        sheets.insert("Request".to_string(), sheet(request_rows));
        sheets.insert("Response".to_string(), sheet(response_rows));
        if let Some(rows) = shared_rows {
            sheets.insert("Shared Header".to_string(), sheet(rows));
        }
        let workbook = json!({ "sheets": sheets });
        self.write_file(name, &serde_json::to_string_pretty(&workbook)?)?;
        Ok(name.to_string())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary builds");
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd.env("MSGGEN_TIMESTAMP", TEST_TIMESTAMP); // Pin the clock
        cmd
    }

    pub fn generate_command(&self, spec: &str) -> Command {
        let mut cmd = self.command();
        cmd.arg("generate").arg(spec).arg("--output").arg("generated");
        cmd
    }

    pub fn inspect_command(&self, spec: &str) -> Command {
        let mut cmd = self.command();
        cmd.arg("inspect").arg(spec);
        cmd
    }

    pub fn validate_command(&self, dir: &str) -> Command {
        let mut cmd = self.command();
        cmd.arg("validate").arg(dir);
        cmd
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn output_exists(&self, path: &str) -> bool {
        self.project_dir.join("generated").join(path).exists()
    }

    pub fn read_output(&self, path: &str) -> Result<String> {
        self.read_file(&format!("generated/{}", path))
    }
}

/// Rows 1-7 carry the metadata cells, row 8 the header, rows 9+ the data.
fn sheet(rows: Vec<Value>) -> Value {
    let mut all = vec![
        json!([]),
        json!([null, null, "Create Application"]),
        json!([null, null, "CreateApplication", null, "01.00"]),
        json!([]),
        json!([]),
        json!([]),
        json!([]),
        json!([
            "Seg lvl",
            "Field Name",
            "Description",
            "Length",
            "Messaging Datatype",
            "Opt(O/M)",
            "GMR Physical Name",
            "Enum Values"
        ]),
    ];
    all.extend(rows);
    Value::Array(all)
}
