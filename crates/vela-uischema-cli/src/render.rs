//! Offline rendering of UI schemas from local files.
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use vela_uischema::{
    document, merge,
    parameter::UiParameter,
    render::{self, Renderer},
};

use crate::output::{self, OutputFormat};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to read {path:?}"))]
    ReadFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse {path:?}"))]
    ParseDocument {
        source: document::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to render UI schema"))]
    Render { source: render::Error },

    #[snafu(display("failed to write UI schema"))]
    WriteOutput { source: output::Error },

    #[snafu(display("failed to serialize UI schema document schema"))]
    SerializeJsonSchema { source: serde_json::Error },
}

#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct RenderArguments {
    /// OpenAPI v3 JSON schema of the definition parameters.
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Custom UI schema (JSON or YAML) to merge onto the rendered default.
    #[arg(long, value_name = "FILE")]
    pub custom: Option<PathBuf>,

    #[arg(long, short, value_enum, default_value_t)]
    pub output: OutputFormat,
}

pub async fn run(arguments: &RenderArguments) -> Result<String> {
    let schema = read_file(&arguments.schema).await?;
    let custom = match &arguments.custom {
        Some(path) => Some(read_file(path).await?),
        None => None,
    };

    let parameters = render_documents(&schema, custom.as_deref())
        .map_err(|error| error.with_paths(&arguments.schema, arguments.custom.as_deref()))?;

    tracing::debug!(parameters.len = parameters.len(), "rendered UI schema");
    arguments
        .output
        .serialize(&parameters)
        .context(WriteOutputSnafu)
}

/// Returns the JSON schema of UI schema documents.
pub fn json_schema() -> Result<String> {
    let schema = schemars::schema_for!(Vec<UiParameter>);
    serde_json::to_string_pretty(&schema).context(SerializeJsonSchemaSnafu)
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .context(ReadFileSnafu { path })
}

#[derive(Debug)]
enum DocumentError {
    Schema(document::Error),
    Custom(document::Error),
    Render(render::Error),
}

impl DocumentError {
    fn with_paths(self, schema: &Path, custom: Option<&Path>) -> Error {
        match self {
            Self::Schema(source) => Error::ParseDocument {
                source,
                path: schema.to_owned(),
            },
            Self::Custom(source) => Error::ParseDocument {
                source,
                path: custom.map(Path::to_owned).unwrap_or_default(),
            },
            Self::Render(source) => Error::Render { source },
        }
    }
}

/// Renders `schema` strictly, unrecognized schema shapes are reported instead of skipped.
fn render_documents(
    schema: &str,
    custom: Option<&str>,
) -> Result<Vec<UiParameter>, DocumentError> {
    let schema = document::parse_schema(schema).map_err(DocumentError::Schema)?;
    let default_tree = Renderer::default()
        .render_default(Some(&schema))
        .map_err(DocumentError::Render)?;

    let custom_tree = custom
        .map(document::parse_ui_schema)
        .transpose()
        .map_err(DocumentError::Custom)?
        .unwrap_or_default();

    Ok(merge(default_tree, custom_tree))
}
