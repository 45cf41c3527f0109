use clap::{Parser, Subcommand};
use snafu::{ResultExt, Snafu};

mod definition;
mod output;
mod render;
mod telemetry;

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to initialize logging"))]
    Telemetry { source: telemetry::Error },

    #[snafu(display("failed to render UI schema"))]
    Render { source: render::Error },

    #[snafu(display("failed to run definition command"))]
    Definition { source: definition::Error },
}

/// Derives UI parameter forms from definition schemas.
#[derive(Debug, Parser)]
#[command(name = "vela-uischema", version, about)]
struct Cli {
    #[command(flatten)]
    telemetry: telemetry::TelemetryOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the UI schema of a local OpenAPI schema, optionally merging a custom UI schema.
    Render(render::RenderArguments),

    /// Print the JSON schema of UI schema documents.
    Schema,

    /// Work with the definitions of a cluster.
    Definition(definition::DefinitionArguments),
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    telemetry::init(&cli.telemetry).context(TelemetrySnafu)?;

    let output = match cli.command {
        Command::Render(arguments) => render::run(&arguments).await.context(RenderSnafu)?,
        Command::Schema => render::json_schema().context(RenderSnafu)?,
        Command::Definition(arguments) => definition::run(arguments)
            .await
            .context(DefinitionSnafu)?,
    };

    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;
    use crate::{
        definition::{DefinitionArguments, DefinitionCommand},
        output::OutputFormat,
        render::RenderArguments,
    };

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(
        &["vela-uischema", "render", "--schema", "schema.json"],
        RenderArguments {
            schema: PathBuf::from("schema.json"),
            custom: None,
            output: OutputFormat::Yaml,
        }
    )]
    #[case(
        &["vela-uischema", "render", "--schema", "s.json", "--custom", "c.yaml", "-o", "json"],
        RenderArguments {
            schema: PathBuf::from("s.json"),
            custom: Some(PathBuf::from("c.yaml")),
            output: OutputFormat::Json,
        }
    )]
    fn parse_render(#[case] args: &[&str], #[case] expected: RenderArguments) {
        let cli = Cli::try_parse_from(args).expect("arguments are valid");

        let Command::Render(arguments) = cli.command else {
            unreachable!("render command was given");
        };
        assert_eq!(arguments, expected);
    }

    #[test]
    fn parse_definition_set_status() {
        let cli = Cli::try_parse_from([
            "vela-uischema",
            "definition",
            "--namespace",
            "kubevela",
            "set-status",
            "scaler",
            "--type",
            "trait",
            "--hidden",
            "true",
        ])
        .expect("arguments are valid");

        let Command::Definition(arguments) = cli.command else {
            unreachable!("definition command was given");
        };
        assert_eq!(
            arguments,
            DefinitionArguments {
                namespace: "kubevela".to_owned(),
                output: OutputFormat::Yaml,
                command: DefinitionCommand::SetStatus {
                    name: "scaler".to_owned(),
                    definition_type: "trait".to_owned(),
                    hidden: true,
                },
            }
        );
    }

    #[test]
    fn rotation_period_requires_log_directory() {
        let result = Cli::try_parse_from([
            "vela-uischema",
            "--file-log-rotation-period",
            "daily",
            "schema",
        ]);

        assert!(result.is_err());
    }
}
