use serde::Serialize;
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize output as YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to serialize output as JSON"))]
    SerializeJson { source: serde_json::Error },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn serialize<T: Serialize>(self, value: &T) -> Result<String, Error> {
        match self {
            Self::Yaml => serde_yaml::to_string(value).context(SerializeYamlSnafu),
            Self::Json => serde_json::to_string_pretty(value).context(SerializeJsonSnafu),
        }
    }
}
