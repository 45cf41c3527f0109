//! Console and file logging of the command line.
//!
//! Console logs are written to stderr, so that rendered output on stdout can be piped. The level
//! of each output is controlled by an environment variable using the [`EnvFilter`] syntax, for
//! example `CONSOLE_LOG_LEVEL=vela_definitions=debug`.
use std::path::PathBuf;

use snafu::{ResultExt, Snafu};
use tracing::{level_filters::LevelFilter, subscriber::SetGlobalDefaultError};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, filter::Directive, layer::SubscriberExt};

type Result<T, E = Error> = std::result::Result<T, E>;

/// The environment variable used to set the console log level filter.
pub const CONSOLE_LOG_LEVEL: &str = "CONSOLE_LOG_LEVEL";

/// The environment variable used to set the rolling file log level filter.
pub const FILE_LOG_LEVEL: &str = "FILE_LOG_LEVEL";

const FILE_LOG_PREFIX: &str = "vela-uischema";
const FILE_LOG_SUFFIX: &str = "tracing-rs.json";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to initialize rolling file appender"))]
    InitRollingFileAppender { source: InitError },

    #[snafu(display("unable to set the global default subscriber"))]
    SetGlobalDefaultSubscriber { source: SetGlobalDefaultError },
}

#[derive(clap::Args, Debug, Default, PartialEq, Eq)]
pub struct TelemetryOptions {
    /// Disable console logs.
    #[arg(long, env)]
    pub console_log_disabled: bool,

    /// Enable logging to files located in the specified DIRECTORY.
    #[arg(long, env, value_name = "DIRECTORY", group = "file_log")]
    pub file_log_directory: Option<PathBuf>,

    /// Time PERIOD after which log files are rolled over.
    #[arg(long, env, value_name = "PERIOD", requires = "file_log")]
    pub file_log_rotation_period: Option<RotationPeriod>,
}

/// Supported periods when the log file is rolled over.
#[derive(
    clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "PascalCase")]
pub enum RotationPeriod {
    Minutely,
    Hourly,
    Daily,

    #[default]
    Never,
}

impl From<RotationPeriod> for Rotation {
    fn from(value: RotationPeriod) -> Self {
        match value {
            RotationPeriod::Minutely => Self::MINUTELY,
            RotationPeriod::Hourly => Self::HOURLY,
            RotationPeriod::Daily => Self::DAILY,
            RotationPeriod::Never => Self::NEVER,
        }
    }
}

/// Installs the configured log outputs as the global default subscriber.
///
/// Both outputs default to INFO. Nothing is installed if all outputs are disabled.
pub fn init(options: &TelemetryOptions) -> Result<()> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if !options.console_log_disabled {
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter_builder(CONSOLE_LOG_LEVEL, LevelFilter::INFO))
                .boxed(),
        );
    }

    if let Some(file_log_directory) = &options.file_log_directory {
        let file_appender = RollingFileAppender::builder()
            .rotation(options.file_log_rotation_period.unwrap_or_default().into())
            .filename_prefix(FILE_LOG_PREFIX)
            .filename_suffix(FILE_LOG_SUFFIX)
            .build(file_log_directory)
            .context(InitRollingFileAppenderSnafu)?;

        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_filter(env_filter_builder(FILE_LOG_LEVEL, LevelFilter::INFO))
                .boxed(),
        );
    }

    if !layers.is_empty() {
        tracing::subscriber::set_global_default(tracing_subscriber::registry().with(layers))
            .context(SetGlobalDefaultSubscriberSnafu)?;
    }

    Ok(())
}

fn env_filter_builder(env_var: &str, default_directive: impl Into<Directive>) -> EnvFilter {
    EnvFilter::builder()
        .with_env_var(env_var)
        .with_default_directive(default_directive.into())
        .from_env_lossy()
}
