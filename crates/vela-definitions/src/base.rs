use std::collections::BTreeMap;

use kube::{ResourceExt, api::DynamicObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{OptionExt, Snafu};

use crate::{
    consts::{
        ADDON_APPLICATION_PREFIX, ALIAS_ANNOTATION, CATEGORY_ANNOTATION, DESCRIPTION_ANNOTATION,
        ICON_ANNOTATION, UI_HIDDEN_LABEL,
    },
    kind::DefinitionType,
};

#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(display("invalid {kind} {name:?}: spec must be an object"))]
pub struct InvalidDefinitionError {
    kind: &'static str,
    name: String,
}

#[derive(
    Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DefinitionStatus {
    #[default]
    Enable,
    Disable,
}

/// The summary of a definition shown in definition lists.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionBase {
    pub name: String,

    #[serde(default)]
    pub alias: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub status: DefinitionStatus,

    /// The addon which installed this definition, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_addon: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub workload_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Value>,

    #[serde(default, rename = "trait", skip_serializing_if = "Option::is_none")]
    pub trait_spec: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_step: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Value>,
}

impl DefinitionBase {
    /// Summarizes `definition`, which must be of `definition_type`.
    pub fn from_definition(
        definition: &DynamicObject,
        definition_type: DefinitionType,
    ) -> Result<Self, InvalidDefinitionError> {
        let name = definition.name_any();
        let spec = definition
            .data
            .get("spec")
            .filter(|spec| spec.is_object())
            .cloned()
            .context(InvalidDefinitionSnafu {
                kind: definition_type.kind(),
                name: name.clone(),
            })?;

        let annotations = definition.annotations();
        let annotation = |key: &str| annotations.get(key).cloned().unwrap_or_default();

        let owner_addon = definition
            .owner_references()
            .iter()
            .find_map(|owner| owner.name.strip_prefix(ADDON_APPLICATION_PREFIX))
            .unwrap_or_default()
            .to_owned();

        let status = if definition.labels().contains_key(UI_HIDDEN_LABEL) {
            DefinitionStatus::Disable
        } else {
            DefinitionStatus::Enable
        };

        let mut base = Self {
            alias: annotation(ALIAS_ANNOTATION),
            description: annotation(DESCRIPTION_ANNOTATION),
            icon: annotation(ICON_ANNOTATION),
            category: annotation(CATEGORY_ANNOTATION),
            labels: definition.labels().clone(),
            status,
            owner_addon,
            name,
            ..Default::default()
        };

        match definition_type {
            DefinitionType::Component => {
                base.workload_type = spec
                    .pointer("/workload/type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                base.component = Some(spec);
            }
            DefinitionType::Trait => base.trait_spec = Some(spec),
            DefinitionType::WorkflowStep => base.workflow_step = Some(spec),
            DefinitionType::Policy => base.policy = Some(spec),
        }

        Ok(base)
    }

    pub fn is_hidden(&self) -> bool {
        self.status == DefinitionStatus::Disable
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;

    fn definition(input: &str) -> DynamicObject {
        serde_yaml::from_str(input).expect("test definition is valid")
    }

    #[test]
    fn component_definition() {
        let definition = definition(indoc! {"
            apiVersion: core.oam.dev/v1beta1
            kind: ComponentDefinition
            metadata:
              name: webservice
              namespace: vela-system
              annotations:
                definition.oam.dev/alias: Web Service
                definition.oam.dev/description: Describes long-running, scalable, containerized services
                custom.definition.oam.dev/icon: https://example.com/webservice.svg
                custom.definition.oam.dev/category: Application Delivery
              labels:
                custom.definition.oam.dev/ui-hidden: \"true\"
              ownerReferences:
                - apiVersion: core.oam.dev/v1beta1
                  kind: Application
                  name: some-app
                  uid: 3c5bb5c1-ad52-4c0e-9bd4-0c7b4f0b8c11
                - apiVersion: core.oam.dev/v1beta1
                  kind: Application
                  name: addon-fluxcd
                  uid: 9f0e7a6c-3b1d-4f55-8a2b-1b6ad3d2c7e0
            spec:
              workload:
                type: deployments.apps
              schematic:
                cue:
                  template: 'parameter: {}'
        "});

        let base = DefinitionBase::from_definition(&definition, DefinitionType::Component)
            .expect("definition is valid");

        assert_eq!(base.name, "webservice");
        assert_eq!(base.alias, "Web Service");
        assert_eq!(
            base.description,
            "Describes long-running, scalable, containerized services"
        );
        assert_eq!(base.icon, "https://example.com/webservice.svg");
        assert_eq!(base.category, "Application Delivery");
        assert_eq!(base.status, DefinitionStatus::Disable);
        assert!(base.is_hidden());
        assert_eq!(base.owner_addon, "fluxcd");
        assert_eq!(base.workload_type, "deployments.apps");
        assert_eq!(
            base.component
                .as_ref()
                .and_then(|spec| spec.pointer("/schematic/cue/template")),
            Some(&json!("parameter: {}"))
        );
        assert_eq!(base.trait_spec, None);
    }

    #[test]
    fn trait_definition_serializes_spec_as_trait() {
        let definition = definition(indoc! {"
            apiVersion: core.oam.dev/v1beta1
            kind: TraitDefinition
            metadata:
              name: scaler
            spec:
              appliesToWorkloads: ['*']
        "});

        let base = DefinitionBase::from_definition(&definition, DefinitionType::Trait)
            .expect("definition is valid");

        assert_eq!(base.status, DefinitionStatus::Enable);
        assert_eq!(base.owner_addon, "");
        assert_eq!(
            serde_json::to_value(&base).expect("base serializes"),
            json!({
                "name": "scaler",
                "alias": "",
                "description": "",
                "icon": "",
                "labels": {},
                "category": "",
                "status": "enable",
                "trait": {"appliesToWorkloads": ["*"]},
            })
        );
    }

    #[test]
    fn definition_without_spec() {
        let definition = definition(indoc! {"
            apiVersion: core.oam.dev/v1beta1
            kind: PolicyDefinition
            metadata:
              name: topology
            spec: invalid
        "});

        assert_eq!(
            DefinitionBase::from_definition(&definition, DefinitionType::Policy),
            Err(InvalidDefinitionError {
                kind: "PolicyDefinition",
                name: "topology".to_owned(),
            })
        );
    }
}
