//! Lists definitions and serves their (customized) UI parameter forms.
use kube::{ResourceExt, api::DynamicObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{OptionExt, ResultExt, Snafu};
use vela_uischema::{
    document, merge,
    parameter::UiParameter,
    render::{self, RenderOptions, Renderer, ShapeErrorPolicy},
    schema::StructuralSchema,
};

use crate::{
    base::{DefinitionBase, InvalidDefinitionError},
    consts::{
        ADDON_APPLICATION_PREFIX, SCHEMA_DOCUMENT_KEY, UI_HIDDEN_LABEL, UI_SCHEMA_DOCUMENT_KEY,
    },
    kind::{DefinitionType, DefinitionTypeNotSupportedError},
    selector::DefinitionQuery,
    store::{self, DefinitionStore},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("unsupported definition type"))]
    ParseDefinitionType {
        source: DefinitionTypeNotSupportedError,
    },

    #[snafu(display("{kind} {name:?} not found"))]
    DefinitionNotFound { kind: &'static str, name: String },

    #[snafu(display("failed to access definition store"))]
    Store { source: store::Error },

    #[snafu(display("failed to summarize definition"))]
    InvalidDefinition { source: InvalidDefinitionError },

    #[snafu(display("failed to read schema document {document_name:?}"))]
    ParseSchemaDocument {
        source: document::Error,
        document_name: String,
    },

    #[snafu(display("failed to render UI schema of {document_name:?}"))]
    RenderUiSchema {
        source: render::Error,
        document_name: String,
    },

    #[snafu(display("failed to serialize UI schema"))]
    SerializeUiSchema { source: document::Error },
}

/// A definition together with its parameter schema and UI form.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionDetail {
    #[serde(flatten)]
    pub definition: DefinitionBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_schema: Option<StructuralSchema>,

    #[serde(default)]
    pub ui_schema: Vec<UiParameter>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDefinitionStatus {
    pub definition_type: String,

    #[serde(rename = "hiddenInUI")]
    pub hidden_in_ui: bool,
}

/// Name of the document holding the OpenAPI v3 schema of a definition.
pub fn schema_document_name(definition_type: DefinitionType, name: &str) -> String {
    format!("{definition_type}-schema-{name}")
}

/// Name of the document holding the custom UI schema of a definition.
pub fn ui_schema_document_name(definition_type: DefinitionType, name: &str) -> String {
    format!("{definition_type}-uischema-{name}")
}

pub struct DefinitionService<S> {
    store: S,
    renderer: Renderer,
}

impl<S: DefinitionStore> DefinitionService<S> {
    /// Schemas which can not be fully understood are rendered on a best-effort basis, so that a
    /// single odd property does not hide the whole form.
    pub fn new(store: S) -> Self {
        Self::with_render_options(
            store,
            RenderOptions {
                shape_errors: ShapeErrorPolicy::RenderLeaf,
                ..RenderOptions::default()
            },
        )
    }

    pub fn with_render_options(store: S, options: RenderOptions) -> Self {
        Self {
            store,
            renderer: Renderer::new(options),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[tracing::instrument(skip(self, query), fields(query = %query))]
    pub async fn list_definitions(&self, query: &DefinitionQuery) -> Result<Vec<DefinitionBase>> {
        let definition_type: DefinitionType = query
            .definition_type
            .parse()
            .context(ParseDefinitionTypeSnafu)?;

        let definitions = self
            .store
            .list_definitions(definition_type, &query.label_selector())
            .await
            .context(StoreSnafu)?;

        let mut bases = Vec::new();
        for definition in definitions
            .iter()
            .filter(|definition| applies_to_workload(definition, &query.applied_workloads))
            .filter(|definition| is_owned_by_addon(definition, &query.owner_addon))
        {
            match DefinitionBase::from_definition(definition, definition_type) {
                Ok(base) => bases.push(base),
                Err(error) => tracing::error!(
                    definition.name = %definition.name_any(),
                    error = &error as &dyn std::error::Error,
                    "skipping definition which can not be summarized"
                ),
            }
        }

        tracing::debug!(definitions.count = bases.len(), "listed definitions");
        Ok(bases)
    }

    /// Returns the definition with its schema and the default UI schema derived from it, with the
    /// stored custom UI schema merged on top.
    #[tracing::instrument(skip(self))]
    pub async fn detail_definition(
        &self,
        name: &str,
        definition_type: &str,
    ) -> Result<DefinitionDetail> {
        let definition_type: DefinitionType =
            definition_type.parse().context(ParseDefinitionTypeSnafu)?;
        let definition = self.get_definition(definition_type, name).await?;
        let base = DefinitionBase::from_definition(&definition, definition_type)
            .context(InvalidDefinitionSnafu)?;

        let document_name = schema_document_name(definition_type, name);
        let api_schema = self
            .store
            .get_document(&document_name)
            .await
            .context(StoreSnafu)?
            .and_then(|mut document| document.remove(SCHEMA_DOCUMENT_KEY))
            .map(|schema| document::parse_schema(&schema))
            .transpose()
            .with_context(|_| ParseSchemaDocumentSnafu {
                document_name: document_name.clone(),
            })?;

        let default_ui_schema = self
            .renderer
            .render_default(api_schema.as_ref())
            .context(RenderUiSchemaSnafu { document_name })?;
        let custom_ui_schema = self.custom_ui_schema(definition_type, name).await?;

        Ok(DefinitionDetail {
            definition: base,
            api_schema,
            ui_schema: merge(default_ui_schema, custom_ui_schema),
        })
    }

    /// Stores `ui_schema` as the custom UI schema of a definition and returns the resulting
    /// (merged) UI schema.
    #[tracing::instrument(skip(self, ui_schema), fields(ui_schema.len = ui_schema.len()))]
    pub async fn add_ui_schema(
        &self,
        name: &str,
        definition_type: &str,
        ui_schema: &[UiParameter],
    ) -> Result<Vec<UiParameter>> {
        let parsed_type: DefinitionType =
            definition_type.parse().context(ParseDefinitionTypeSnafu)?;
        let serialized =
            document::to_ui_schema_document(ui_schema).context(SerializeUiSchemaSnafu)?;

        self.store
            .put_document_entry(
                &ui_schema_document_name(parsed_type, name),
                UI_SCHEMA_DOCUMENT_KEY,
                serialized,
            )
            .await
            .context(StoreSnafu)?;

        let detail = self.detail_definition(name, definition_type).await?;
        Ok(detail.ui_schema)
    }

    /// Shows or hides a definition in the UI.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        name: &str,
        update: &UpdateDefinitionStatus,
    ) -> Result<DefinitionDetail> {
        let definition_type: DefinitionType = update
            .definition_type
            .parse()
            .context(ParseDefinitionTypeSnafu)?;
        let mut definition = self.get_definition(definition_type, name).await?;

        let hidden = definition.labels().contains_key(UI_HIDDEN_LABEL);
        if hidden != update.hidden_in_ui {
            if update.hidden_in_ui {
                definition
                    .labels_mut()
                    .insert(UI_HIDDEN_LABEL.to_owned(), "true".to_owned());
            } else {
                definition.labels_mut().remove(UI_HIDDEN_LABEL);
            }

            tracing::info!(hidden = update.hidden_in_ui, "updating definition visibility");
            self.store
                .update_definition(definition_type, definition)
                .await
                .context(StoreSnafu)?;
        }

        self.detail_definition(name, &update.definition_type).await
    }

    async fn get_definition(
        &self,
        definition_type: DefinitionType,
        name: &str,
    ) -> Result<DynamicObject> {
        self.store
            .get_definition(definition_type, name)
            .await
            .context(StoreSnafu)?
            .context(DefinitionNotFoundSnafu {
                kind: definition_type.kind(),
                name,
            })
    }

    /// A missing or unreadable custom UI schema is treated like an empty one.
    async fn custom_ui_schema(
        &self,
        definition_type: DefinitionType,
        name: &str,
    ) -> Result<Vec<UiParameter>> {
        let document_name = ui_schema_document_name(definition_type, name);
        let Some(ui_schema) = self
            .store
            .get_document(&document_name)
            .await
            .context(StoreSnafu)?
            .and_then(|mut document| document.remove(UI_SCHEMA_DOCUMENT_KEY))
        else {
            return Ok(Vec::new());
        };

        match document::parse_ui_schema(&ui_schema) {
            Ok(parameters) => Ok(parameters),
            Err(error) => {
                tracing::warn!(
                    k8s.configmap.name = %document_name,
                    error = &error as &dyn std::error::Error,
                    "ignoring unreadable custom UI schema"
                );
                Ok(Vec::new())
            }
        }
    }
}

/// Traits and policies can restrict the workloads they apply to, `*` matches all of them.
fn applies_to_workload(definition: &DynamicObject, workload: &str) -> bool {
    if workload.is_empty() {
        return true;
    }

    let Some(applies_to) = definition
        .data
        .pointer("/spec/appliesToWorkloads")
        .and_then(Value::as_array)
        .filter(|applies_to| !applies_to.is_empty())
    else {
        return true;
    };

    applies_to
        .iter()
        .filter_map(Value::as_str)
        .any(|applies_to| applies_to == workload || applies_to == "*")
}

fn is_owned_by_addon(definition: &DynamicObject, addon: &str) -> bool {
    if addon.is_empty() {
        return true;
    }

    let addon_application = format!("{ADDON_APPLICATION_PREFIX}{addon}");
    definition
        .owner_references()
        .iter()
        .any(|owner| owner.name == addon_application)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    fn definition(input: &str) -> DynamicObject {
        serde_yaml::from_str(input).expect("test definition is valid")
    }

    #[rstest]
    #[case("", None, true)]
    #[case("", Some("[]"), true)]
    #[case("deployments.apps", None, true)]
    #[case("deployments.apps", Some("[]"), true)]
    #[case("deployments.apps", Some("['*']"), true)]
    #[case("deployments.apps", Some("[deployments.apps, jobs.batch]"), true)]
    #[case("deployments.apps", Some("[jobs.batch]"), false)]
    fn applied_workload_filter(
        #[case] workload: &str,
        #[case] applies_to: Option<&str>,
        #[case] expected: bool,
    ) {
        let spec = applies_to.map_or_else(
            || "{}".to_owned(),
            |applies_to| format!("{{appliesToWorkloads: {applies_to}}}"),
        );
        let definition = definition(&format!(
            "{{apiVersion: core.oam.dev/v1beta1, kind: TraitDefinition, metadata: {{name: t}}, spec: {spec}}}"
        ));

        assert_eq!(applies_to_workload(&definition, workload), expected);
    }

    #[rstest]
    #[case("", true)]
    #[case("fluxcd", true)]
    #[case("flux", false)]
    #[case("velaux", false)]
    fn owner_addon_filter(#[case] addon: &str, #[case] expected: bool) {
        let definition = definition(indoc! {"
            apiVersion: core.oam.dev/v1beta1
            kind: TraitDefinition
            metadata:
              name: kustomize-patch
              ownerReferences:
                - apiVersion: core.oam.dev/v1beta1
                  kind: Application
                  name: addon-fluxcd
                  uid: 9f0e7a6c-3b1d-4f55-8a2b-1b6ad3d2c7e0
            spec: {}
        "});

        assert_eq!(is_owned_by_addon(&definition, addon), expected);
    }

    #[test]
    fn document_names() {
        assert_eq!(
            schema_document_name(DefinitionType::WorkflowStep, "notification"),
            "workflowstep-schema-notification"
        );
        assert_eq!(
            ui_schema_document_name(DefinitionType::Component, "webservice"),
            "component-uischema-webservice"
        );
    }

    #[test]
    fn status_update_wire_format() {
        let update: UpdateDefinitionStatus =
            serde_json::from_str(r#"{"definitionType": "trait", "hiddenInUI": true}"#)
                .expect("test JSON is valid");

        assert_eq!(
            update,
            UpdateDefinitionStatus {
                definition_type: "trait".to_owned(),
                hidden_in_ui: true,
            }
        );
    }
}
