//! Derives the default UI parameter tree from a [`StructuralSchema`].
use std::{
    collections::BTreeSet,
    fmt::{Display, Write},
};

use snafu::{ResultExt, Snafu};

use crate::{
    label::{self, OptionLabelFn},
    order::{self, BASE_SORT},
    parameter::{ParameterOption, UiParameter, UiType, Validate},
    schema::{SchemaShape, ShapeError, StructuralSchema},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display("unrecognized schema shape at {path}"))]
    SchemaShape { source: ShapeError, path: FieldPath },
}

/// Dotted path from the root schema to a node, for example `ports.items.name`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Self { segments }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_char('.')?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for FieldPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// What the [`Renderer`] does with a node whose shape it does not recognize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShapeErrorPolicy {
    /// Fail the whole render with [`Error::SchemaShape`].
    #[default]
    Abort,

    /// Log a warning and render the node as a leaf without sub parameters.
    RenderLeaf,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    /// The `sort` value of the first parameter on every level.
    pub base_sort: u32,

    /// Labels the options derived from `enum` literals.
    pub option_label: OptionLabelFn,

    pub shape_errors: ShapeErrorPolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            base_sort: BASE_SORT,
            option_label: label::option_label,
            shape_errors: ShapeErrorPolicy::default(),
        }
    }
}

/// Derives default UI parameter trees.
///
/// Rendering is a pure function of the schema and the [`RenderOptions`], so a single renderer
/// can be shared freely.
///
/// ```
/// use vela_uischema::{render::Renderer, schema::StructuralSchema};
///
/// let schema: StructuralSchema = serde_json::from_str(r#"{
///     "type": "object",
///     "required": ["image"],
///     "properties": {
///         "image": {"type": "string"},
///         "cmd": {"type": "array", "items": {"type": "string"}}
///     }
/// }"#).unwrap();
///
/// let parameters = Renderer::default().render_default(Some(&schema)).unwrap();
///
/// assert_eq!(parameters[0].json_key, "image");
/// assert_eq!(parameters[0].sort, 100);
/// assert_eq!(parameters[1].ui_type, "Strings");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders one parameter per property of the (object) `schema`.
    ///
    /// A missing schema or a schema without properties results in an empty tree. Every node
    /// descended into, including the root and array elements, must have a recognized shape.
    pub fn render_default(&self, schema: Option<&StructuralSchema>) -> Result<Vec<UiParameter>> {
        match schema {
            Some(schema) => self.render_properties(schema, &FieldPath::default()),
            None => Ok(Vec::new()),
        }
    }

    fn render_properties(
        &self,
        schema: &StructuralSchema,
        path: &FieldPath,
    ) -> Result<Vec<UiParameter>> {
        if self.classify(schema, path)?.is_none() {
            return Ok(Vec::new());
        }
        let Some(properties) = &schema.properties else {
            return Ok(Vec::new());
        };

        let mut parameters = properties
            .iter()
            .map(|(key, property)| {
                self.render_field(key, property, &schema.required, &path.child(key))
            })
            .collect::<Result<Vec<_>>>()?;

        order::order_by_derivation(&mut parameters, self.options.base_sort);
        Ok(parameters)
    }

    fn render_field(
        &self,
        key: &str,
        schema: &StructuralSchema,
        parent_required: &BTreeSet<String>,
        path: &FieldPath,
    ) -> Result<UiParameter> {
        let shape = self
            .classify(schema, path)?
            .unwrap_or(SchemaShape::Primitive);

        let mut parameter = UiParameter {
            json_key: key.to_owned(),
            label: label::first_upper(key),
            description: schema.description.clone().unwrap_or_default(),
            validate: Some(self.validate(key, schema, parent_required)),
            sort: self.options.base_sort,
            ..Default::default()
        };

        let mut element_type = None;
        let mut has_properties = false;
        match shape {
            SchemaShape::Primitive => {}
            SchemaShape::Array { items } => {
                element_type = items.effective_type();
                parameter.sub_parameters = self.render_properties(items, &path.child("items"))?;
            }
            SchemaShape::Object { properties } => {
                has_properties = !properties.is_empty();
                parameter.sub_parameters = self.render_properties(schema, path)?;
            }
            SchemaShape::Map { values } => {
                let values_path = path.child("additionalProperties");
                parameter.sub_parameters = self.render_properties(values, &values_path)?;

                let values_key = values.title.as_deref().unwrap_or_default();
                let additional_parameter =
                    self.render_field(values_key, values, &values.required, &values_path)?;
                parameter.additional_parameter = Some(Box::new(additional_parameter));
                parameter.additional = Some(true);
            }
        }

        let has_options = !schema.enum_values.is_empty();
        parameter.ui_type = UiType::derive(
            schema.effective_type(),
            has_options,
            element_type,
            has_properties,
        )
        .to_string();

        Ok(parameter)
    }

    /// Returns the shape of `schema`, or [`None`] if it is unrecognized and rendered as a leaf.
    fn classify<'a>(
        &self,
        schema: &'a StructuralSchema,
        path: &FieldPath,
    ) -> Result<Option<SchemaShape<'a>>> {
        match schema.shape() {
            Ok(shape) => Ok(Some(shape)),
            Err(source) => match self.options.shape_errors {
                ShapeErrorPolicy::Abort => {
                    Err(source).context(SchemaShapeSnafu { path: path.clone() })
                }
                ShapeErrorPolicy::RenderLeaf => {
                    tracing::warn!(
                        schema.path = %path,
                        error = %source,
                        "rendering unrecognized schema shape as a leaf"
                    );
                    Ok(None)
                }
            },
        }
    }

    fn validate(
        &self,
        key: &str,
        schema: &StructuralSchema,
        parent_required: &BTreeSet<String>,
    ) -> Validate {
        Validate {
            required: parent_required.contains(key),
            default_value: schema.default.clone(),
            options: schema
                .enum_values
                .iter()
                .map(|value| ParameterOption {
                    label: (self.options.option_label)(value),
                    value: value.clone(),
                })
                .collect(),
            min: schema.minimum,
            max: schema.maximum,
            min_length: schema.min_length,
            max_length: schema.max_length,
            pattern: schema.pattern.clone(),
            immutable: false,
        }
    }
}
