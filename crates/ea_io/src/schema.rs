//! Embedded JSON Schemas (Draft 7) for the engine's input files.
//!
//! Schemas catch shape errors (missing fields, wrong types, empty ids, merit
//! out of range) before typed deserialisation. Cross-record rules such as
//! duplicate ids belong to the pipeline's validation report instead.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::IoError;

const ROSTER_SCHEMA: &str = include_str!("../schemas/roster.schema.json");
const DEPARTMENTS_SCHEMA: &str = include_str!("../schemas/departments.schema.json");
const PARAMS_SCHEMA: &str = include_str!("../schemas/params.schema.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Roster,
    Departments,
    Params,
}

impl SchemaKind {
    pub fn name(self) -> &'static str {
        match self {
            SchemaKind::Roster => "roster",
            SchemaKind::Departments => "departments",
            SchemaKind::Params => "params",
        }
    }

    fn source(self) -> &'static str {
        match self {
            SchemaKind::Roster => ROSTER_SCHEMA,
            SchemaKind::Departments => DEPARTMENTS_SCHEMA,
            SchemaKind::Params => PARAMS_SCHEMA,
        }
    }
}

fn compile(kind: SchemaKind) -> Result<JSONSchema, IoError> {
    let schema: Value = serde_json::from_str(kind.source())
        .map_err(|e| IoError::Schema { pointer: "/".into(), msg: format!("{} schema: {e}", kind.name()) })?;
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|e| IoError::Schema {
            pointer: "/".into(),
            msg: format!("{} schema does not compile: {e}", kind.name()),
        })
}

/// Validate `instance`; report the first violation with its JSON Pointer.
pub fn validate_value(kind: SchemaKind, instance: &Value) -> Result<(), IoError> {
    let compiled = compile(kind)?;
    let result = compiled.validate(instance);
    if let Err(mut errors) = result {
        if let Some(err) = errors.next() {
            let ptr = err.instance_path.to_string();
            return Err(IoError::Schema {
                pointer: if ptr.is_empty() { "/".to_string() } else { ptr },
                msg: format!("{}: {err}", kind.name()),
            });
        }
    }
    Ok(())
}
