//! Derives the parameter forms of OAM definitions from their OpenAPI v3 schemas.
//!
//! Every configurable property of a definition becomes a [`UiParameter`](parameter::UiParameter).
//! The resulting default tree can be amended by a sparse custom tree, which overrides labels,
//! widgets, ordering and validation of individual parameters:
//!
//! ```
//! use vela_uischema::{document, merge, render_default};
//!
//! let schema = document::parse_schema(r#"{
//!     "type": "object",
//!     "properties": {
//!         "replicas": {"type": "integer"},
//!         "image": {"type": "string"}
//!     }
//! }"#).unwrap();
//! let custom = document::parse_ui_schema("[{jsonKey: replicas, sort: 1}]").unwrap();
//!
//! let parameters = merge(render_default(&schema).unwrap(), custom);
//!
//! assert_eq!(parameters[0].json_key, "replicas");
//! assert_eq!(parameters[1].json_key, "image");
//! ```
pub mod document;
pub mod label;
pub mod merge;
pub mod order;
pub mod parameter;
pub mod render;
pub mod schema;

pub use merge::merge;

/// Renders the default tree of `schema` with the default [`RenderOptions`](render::RenderOptions).
pub fn render_default(
    schema: &schema::StructuralSchema,
) -> render::Result<Vec<parameter::UiParameter>> {
    render::Renderer::default().render_default(Some(schema))
}
