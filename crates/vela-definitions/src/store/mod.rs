//! Access to definitions and their stored documents.
use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::DynamicObject;
use snafu::Snafu;

use crate::{kind::DefinitionType, selector::SelectorError};

mod kube_store;
mod memory;

pub use kube_store::KubeDefinitionStore;
pub use memory::InMemoryDefinitionStore;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("invalid definition selector"))]
    InvalidSelector { source: SelectorError },

    #[snafu(display("failed to list {kind}s"))]
    ListDefinitions {
        source: kube::Error,
        kind: &'static str,
    },

    #[snafu(display("failed to get {kind} {name:?}"))]
    GetDefinition {
        source: kube::Error,
        kind: &'static str,
        name: String,
    },

    #[snafu(display("failed to update {kind} {name:?}"))]
    UpdateDefinition {
        source: kube::Error,
        kind: &'static str,
        name: String,
    },

    #[snafu(display("{kind} {name:?} does not exist"))]
    DefinitionMissing { kind: &'static str, name: String },

    #[snafu(display("failed to get document {name:?}"))]
    GetDocument { source: kube::Error, name: String },

    #[snafu(display("failed to write document {name:?}"))]
    WriteDocument { source: kube::Error, name: String },
}

/// Reads and writes definitions and the documents (schemas) stored next to them.
///
/// Documents are string maps addressed by name, for example
/// `component-schema-webservice`.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Returns the definitions of `definition_type` whose labels match `selector`, ordered by
    /// name.
    async fn list_definitions(
        &self,
        definition_type: DefinitionType,
        selector: &LabelSelector,
    ) -> Result<Vec<DynamicObject>>;

    async fn get_definition(
        &self,
        definition_type: DefinitionType,
        name: &str,
    ) -> Result<Option<DynamicObject>>;

    /// Replaces an existing definition, returning the stored object.
    async fn update_definition(
        &self,
        definition_type: DefinitionType,
        definition: DynamicObject,
    ) -> Result<DynamicObject>;

    async fn get_document(&self, name: &str) -> Result<Option<BTreeMap<String, String>>>;

    /// Sets a single entry of a document, creating the document if it does not exist yet.
    /// Other entries are kept.
    async fn put_document_entry(&self, name: &str, key: &str, value: String) -> Result<()>;
}
