use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::{
    api::core::v1::ConfigMap,
    apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta},
};
use kube::{
    Api, Client, ResourceExt,
    api::{DynamicObject, ListParams, PostParams},
};
use snafu::ResultExt;

use super::{
    DefinitionStore, GetDefinitionSnafu, GetDocumentSnafu, InvalidSelectorSnafu,
    ListDefinitionsSnafu, Result, UpdateDefinitionSnafu, WriteDocumentSnafu,
};
use crate::{kind::DefinitionType, selector::LabelSelectorExt};

/// Stores definitions as custom resources and documents as ConfigMaps, all in one namespace.
#[derive(Clone)]
pub struct KubeDefinitionStore {
    client: Client,
    namespace: String,
}

impl KubeDefinitionStore {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn definitions(&self, definition_type: DefinitionType) -> Api<DynamicObject> {
        Api::namespaced_with(
            self.client.clone(),
            &self.namespace,
            &definition_type.api_resource(),
        )
    }

    fn documents(&self) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }
}

#[async_trait]
impl DefinitionStore for KubeDefinitionStore {
    async fn list_definitions(
        &self,
        definition_type: DefinitionType,
        selector: &LabelSelector,
    ) -> Result<Vec<DynamicObject>> {
        let selector = selector.to_query_string().context(InvalidSelectorSnafu)?;
        let list_params = ListParams::default().labels(&selector);

        tracing::debug!(
            k8s.kind = definition_type.kind(),
            k8s.namespace = %self.namespace,
            k8s.label_selector = %selector,
            "listing definitions"
        );

        let list = self
            .definitions(definition_type)
            .list(&list_params)
            .await
            .context(ListDefinitionsSnafu {
                kind: definition_type.kind(),
            })?;

        let mut definitions = list.items;
        definitions.sort_by_key(ResourceExt::name_any);
        Ok(definitions)
    }

    async fn get_definition(
        &self,
        definition_type: DefinitionType,
        name: &str,
    ) -> Result<Option<DynamicObject>> {
        self.definitions(definition_type)
            .get_opt(name)
            .await
            .context(GetDefinitionSnafu {
                kind: definition_type.kind(),
                name,
            })
    }

    async fn update_definition(
        &self,
        definition_type: DefinitionType,
        definition: DynamicObject,
    ) -> Result<DynamicObject> {
        let name = definition.name_any();

        self.definitions(definition_type)
            .replace(&name, &PostParams::default(), &definition)
            .await
            .context(UpdateDefinitionSnafu {
                kind: definition_type.kind(),
                name,
            })
    }

    async fn get_document(&self, name: &str) -> Result<Option<BTreeMap<String, String>>> {
        let config_map = self
            .documents()
            .get_opt(name)
            .await
            .context(GetDocumentSnafu { name })?;

        Ok(config_map.map(|config_map| config_map.data.unwrap_or_default()))
    }

    async fn put_document_entry(&self, name: &str, key: &str, value: String) -> Result<()> {
        let api = self.documents();
        let existing = api.get_opt(name).await.context(GetDocumentSnafu { name })?;

        match existing {
            Some(mut config_map) => {
                config_map
                    .data
                    .get_or_insert_with(BTreeMap::new)
                    .insert(key.to_owned(), value);

                tracing::debug!(k8s.configmap.name = name, "updating document entry");
                api.replace(name, &PostParams::default(), &config_map)
                    .await
                    .context(WriteDocumentSnafu { name })?;
            }
            None => {
                let config_map = ConfigMap {
                    metadata: ObjectMeta {
                        name: Some(name.to_owned()),
                        namespace: Some(self.namespace.clone()),
                        ..ObjectMeta::default()
                    },
                    data: Some(BTreeMap::from([(key.to_owned(), value)])),
                    ..ConfigMap::default()
                };

                tracing::debug!(k8s.configmap.name = name, "creating document");
                api.create(&PostParams::default(), &config_map)
                    .await
                    .context(WriteDocumentSnafu { name })?;
            }
        }

        Ok(())
    }
}
