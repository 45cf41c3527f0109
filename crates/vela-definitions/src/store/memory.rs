use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{ResourceExt, api::DynamicObject};
use snafu::{OptionExt, ResultExt};
use tokio::sync::RwLock;

use super::{DefinitionMissingSnafu, DefinitionStore, InvalidSelectorSnafu, Result};
use crate::{kind::DefinitionType, selector::LabelSelectorExt};

type Document = BTreeMap<String, String>;

/// Keeps definitions and documents in memory, for tests and offline use.
#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    definitions: RwLock<HashMap<DefinitionType, BTreeMap<String, DynamicObject>>>,
    documents: RwLock<BTreeMap<String, Document>>,
}

impl InMemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(
        mut self,
        definition_type: DefinitionType,
        definition: DynamicObject,
    ) -> Self {
        self.definitions
            .get_mut()
            .entry(definition_type)
            .or_default()
            .insert(definition.name_any(), definition);
        self
    }

    pub fn with_document<K, V>(
        mut self,
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let document = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.documents.get_mut().insert(name.into(), document);
        self
    }
}

#[async_trait]
impl DefinitionStore for InMemoryDefinitionStore {
    async fn list_definitions(
        &self,
        definition_type: DefinitionType,
        selector: &LabelSelector,
    ) -> Result<Vec<DynamicObject>> {
        let definitions = self.definitions.read().await;
        let mut selected = Vec::new();

        for definition in definitions
            .get(&definition_type)
            .into_iter()
            .flat_map(BTreeMap::values)
        {
            if selector
                .matches(definition.labels())
                .context(InvalidSelectorSnafu)?
            {
                selected.push(definition.clone());
            }
        }

        Ok(selected)
    }

    async fn get_definition(
        &self,
        definition_type: DefinitionType,
        name: &str,
    ) -> Result<Option<DynamicObject>> {
        let definitions = self.definitions.read().await;

        Ok(definitions
            .get(&definition_type)
            .and_then(|definitions| definitions.get(name))
            .cloned())
    }

    async fn update_definition(
        &self,
        definition_type: DefinitionType,
        definition: DynamicObject,
    ) -> Result<DynamicObject> {
        let name = definition.name_any();
        let mut definitions = self.definitions.write().await;

        let stored = definitions
            .get_mut(&definition_type)
            .and_then(|definitions| definitions.get_mut(&name))
            .context(DefinitionMissingSnafu {
                kind: definition_type.kind(),
                name,
            })?;
        *stored = definition.clone();

        Ok(definition)
    }

    async fn get_document(&self, name: &str) -> Result<Option<Document>> {
        Ok(self.documents.read().await.get(name).cloned())
    }

    async fn put_document_entry(&self, name: &str, key: &str, value: String) -> Result<()> {
        self.documents
            .write()
            .await
            .entry(name.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
        Ok(())
    }
}
