//! Definition commands, run against the cluster of the current kube context.
use std::path::PathBuf;

use snafu::{ResultExt, Snafu};
use vela_definitions::{
    consts::DEFAULT_DEFINITION_NAMESPACE,
    selector::DefinitionQuery,
    service::{self, DefinitionService, UpdateDefinitionStatus},
    store::KubeDefinitionStore,
};
use vela_uischema::document;

use crate::output::{self, OutputFormat};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to create Kubernetes client"))]
    CreateClient { source: kube::Error },

    #[snafu(display("failed to read {path:?}"))]
    ReadFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse UI schema {path:?}"))]
    ParseUiSchema {
        source: document::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to list definitions"))]
    List { source: service::Error },

    #[snafu(display("failed to get definition {name:?}"))]
    Show { source: service::Error, name: String },

    #[snafu(display("failed to set UI schema of definition {name:?}"))]
    SetUiSchema { source: service::Error, name: String },

    #[snafu(display("failed to set status of definition {name:?}"))]
    SetStatus { source: service::Error, name: String },

    #[snafu(display("failed to write output"))]
    WriteOutput { source: output::Error },
}

#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct DefinitionArguments {
    /// Namespace containing the definitions and their schema ConfigMaps.
    #[arg(long, env = "VELA_NAMESPACE", default_value = DEFAULT_DEFINITION_NAMESPACE)]
    pub namespace: String,

    #[arg(long, short, value_enum, default_value_t, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: DefinitionCommand,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum DefinitionCommand {
    /// List definitions of one type.
    List {
        #[arg(long = "type", short = 't', default_value = "component")]
        definition_type: String,

        /// Only list definitions applicable to this workload type.
        #[arg(long, default_value = "")]
        applied_workloads: String,

        /// Only list definitions installed by this addon.
        #[arg(long, default_value = "")]
        source_addon: String,

        /// Include definitions hidden from the UI.
        #[arg(long)]
        all: bool,

        /// Either `Application` or `WorkflowRun`.
        #[arg(long, default_value = "")]
        scope: String,
    },

    /// Show a definition with its rendered UI schema.
    Show {
        name: String,

        #[arg(long = "type", short = 't', default_value = "component")]
        definition_type: String,
    },

    /// Store a custom UI schema for a definition and print the merged result.
    SetUiSchema {
        name: String,

        #[arg(long = "type", short = 't', default_value = "component")]
        definition_type: String,

        /// Custom UI schema (JSON or YAML).
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Show or hide a definition in the UI.
    SetStatus {
        name: String,

        #[arg(long = "type", short = 't', default_value = "component")]
        definition_type: String,

        #[arg(long, action = clap::ArgAction::Set, value_name = "BOOL")]
        hidden: bool,
    },
}

pub async fn run(arguments: DefinitionArguments) -> Result<String> {
    let client = kube::Client::try_default()
        .await
        .context(CreateClientSnafu)?;
    let service = DefinitionService::new(KubeDefinitionStore::new(client, arguments.namespace));
    let output = arguments.output;

    match arguments.command {
        DefinitionCommand::List {
            definition_type,
            applied_workloads,
            source_addon,
            all,
            scope,
        } => {
            let query = DefinitionQuery {
                definition_type,
                applied_workloads,
                owner_addon: source_addon,
                query_all: all,
                scope,
            };
            let definitions = service
                .list_definitions(&query)
                .await
                .context(ListSnafu)?;
            output.serialize(&definitions).context(WriteOutputSnafu)
        }
        DefinitionCommand::Show {
            name,
            definition_type,
        } => {
            let detail = service
                .detail_definition(&name, &definition_type)
                .await
                .context(ShowSnafu { name })?;
            output.serialize(&detail).context(WriteOutputSnafu)
        }
        DefinitionCommand::SetUiSchema {
            name,
            definition_type,
            file,
        } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .context(ReadFileSnafu { path: &file })?;
            let ui_schema =
                document::parse_ui_schema(&content).context(ParseUiSchemaSnafu { path: &file })?;

            let merged = service
                .add_ui_schema(&name, &definition_type, &ui_schema)
                .await
                .context(SetUiSchemaSnafu { name })?;
            output.serialize(&merged).context(WriteOutputSnafu)
        }
        DefinitionCommand::SetStatus {
            name,
            definition_type,
            hidden,
        } => {
            let update = UpdateDefinitionStatus {
                definition_type,
                hidden_in_ui: hidden,
            };
            let detail = service
                .update_status(&name, &update)
                .await
                .context(SetStatusSnafu { name })?;
            output.serialize(&detail.definition).context(WriteOutputSnafu)
        }
    }
}
