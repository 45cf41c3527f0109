//! Serves the UI parameter forms of KubeVela definitions.
//!
//! Definitions (`ComponentDefinition`, `TraitDefinition`, ...) and the documents stored next to
//! them are accessed through a [`DefinitionStore`](store::DefinitionStore). The
//! [`DefinitionService`](service::DefinitionService) lists definitions, derives their default UI
//! schema using [`vela_uischema`] and merges user provided customizations onto it.
pub mod base;
pub mod consts;
pub mod kind;
pub mod selector;
pub mod service;
pub mod store;
