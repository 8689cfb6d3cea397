//! msggen - fixed-length message artifact generator
//!
//! msggen ingests a tabular message-specification workbook and emits a
//! coordinated set of wire-format and code artifacts: fixed-length
//! converter XML, data classes, an OpenAPI document with optional split
//! schemas, the canonical intermediate tree, a field-rename mapping, an
//! audit log and an output manifest - deterministically and atomically.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands)
//! - `config`: Configuration file loading and layering
//! - `workbook`: Tabular input collaborator and JSON-grid loader
//! - `parser`: Workbook to intermediate tree
//! - `model`: The intermediate tree and its canonical serialization
//! - `emit`: Artifact emitters (XML, classes, OpenAPI, rename doc)
//! - `validate`: Cross-artifact consistency validator
//! - `output`: Atomic output transaction and manifest
//! - `audit`: Run-scoped audit logging
//! - `pipeline`: Orchestration of the fixed run order
//! - `report`: Console reporting
//! - `utils`: Shared utility functions

pub mod audit;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod utils;
pub mod validate;
pub mod workbook;
