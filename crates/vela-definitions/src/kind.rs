use kube::{api::ApiResource, core::GroupVersionKind};
use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// The API group and version of every definition kind.
pub const DEFINITION_GROUP: &str = "core.oam.dev";
pub const DEFINITION_VERSION: &str = "v1beta1";

#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(display("definition type {definition_type:?} is not supported"))]
pub struct DefinitionTypeNotSupportedError {
    definition_type: String,
}

/// The definition types which can be listed and configured.
///
/// The string form is the lower-case type name used in document keys and queries, for example
/// `workflowstep`.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DefinitionType {
    Component,
    Trait,
    WorkflowStep,
    Policy,
}

impl DefinitionType {
    pub fn kind(self) -> &'static str {
        match self {
            Self::Component => "ComponentDefinition",
            Self::Trait => "TraitDefinition",
            Self::WorkflowStep => "WorkflowStepDefinition",
            Self::Policy => "PolicyDefinition",
        }
    }

    pub fn api_resource(self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(DEFINITION_GROUP, DEFINITION_VERSION, self.kind());
        ApiResource::from_gvk(&gvk)
    }
}

impl std::str::FromStr for DefinitionType {
    type Err = DefinitionTypeNotSupportedError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "component" => Ok(Self::Component),
            "trait" => Ok(Self::Trait),
            "workflowstep" => Ok(Self::WorkflowStep),
            "policy" => Ok(Self::Policy),
            _ => DefinitionTypeNotSupportedSnafu {
                definition_type: input,
            }
            .fail(),
        }
    }
}
