//! Reading and writing the stored documents of a definition.
//!
//! The OpenAPI v3 schema of a definition is stored as JSON. Custom UI schemas are written as
//! JSON as well, but are commonly authored by hand, which is why they are read as YAML (a
//! superset of JSON).
use snafu::{ResultExt, Snafu};

use crate::{parameter::UiParameter, schema::StructuralSchema};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse OpenAPI v3 schema document"))]
    ParseSchema { source: serde_json::Error },

    #[snafu(display("failed to parse UI schema document"))]
    ParseUiSchema { source: serde_yaml::Error },

    #[snafu(display("failed to serialize UI schema document"))]
    SerializeUiSchema { source: serde_json::Error },
}

pub fn parse_schema(document: &str) -> Result<StructuralSchema> {
    serde_json::from_str(document).context(ParseSchemaSnafu)
}

/// Parses a (custom) UI schema, which is a list of [`UiParameter`]s.
///
/// An empty or blank document is an empty list.
pub fn parse_ui_schema(document: &str) -> Result<Vec<UiParameter>> {
    if document.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_yaml::from_str(document).context(ParseUiSchemaSnafu)
}

pub fn to_ui_schema_document(parameters: &[UiParameter]) -> Result<String> {
    serde_json::to_string(parameters).context(SerializeUiSchemaSnafu)
}
