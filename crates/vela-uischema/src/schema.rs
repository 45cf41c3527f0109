//! The structural schema describing the configurable properties of a definition.
//!
//! A [`StructuralSchema`] is the subset of an OpenAPI v3 schema which is relevant for deriving
//! UI parameters. Keywords which are not modelled here (for example `x-kubernetes-*` extensions)
//! are ignored during deserialization.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::Snafu;

/// A problem with the combination of `type`, `properties`, `items` and `additionalProperties`
/// of a single schema node.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ShapeError {
    #[snafu(display("schema populates both {first:?} and {second:?}"))]
    ConflictingStructure {
        first: &'static str,
        second: &'static str,
    },

    #[snafu(display("{field:?} is not allowed for a schema of type {schema_type}"))]
    TypeMismatch {
        field: &'static str,
        schema_type: SchemaType,
    },
}

/// The primitive type of a schema node.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// The `additionalProperties` keyword, which is either a plain flag or the schema of the map
/// values.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<StructuralSchema>),
}

impl AdditionalProperties {
    /// Returns the schema of the map values. The flag form carries no value shape.
    pub fn value_schema(&self) -> Option<&StructuralSchema> {
        match self {
            Self::Allowed(_) => None,
            Self::Schema(schema) => Some(schema),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, StructuralSchema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<StructuralSchema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    /// Names of the properties of this (object) node which must be set.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub required: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// A structural view of a [`StructuralSchema`], see [`StructuralSchema::shape`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SchemaShape<'a> {
    /// A leaf value, no nested structure is known.
    Primitive,

    /// A list, `items` describes a single element.
    Array { items: &'a StructuralSchema },

    /// An object with a fixed set of named properties.
    Object {
        properties: &'a BTreeMap<String, StructuralSchema>,
    },

    /// A free-form map, `values` describes every value.
    Map { values: &'a StructuralSchema },
}

impl StructuralSchema {
    /// Returns the declared type, or the type implied by the populated structural keyword if
    /// the declaration is missing.
    pub fn effective_type(&self) -> Option<SchemaType> {
        self.schema_type.or_else(|| {
            if self.properties.is_some() || self.map_values().is_some() {
                Some(SchemaType::Object)
            } else if self.items.is_some() {
                Some(SchemaType::Array)
            } else {
                None
            }
        })
    }

    /// Classifies this node, checking that at most one of `properties`, `items` and
    /// `additionalProperties` is populated and that it agrees with `type`.
    pub fn shape(&self) -> Result<SchemaShape<'_>, ShapeError> {
        let values = self.map_values();
        let populated: Vec<&'static str> = [
            ("properties", self.properties.is_some()),
            ("items", self.items.is_some()),
            ("additionalProperties", values.is_some()),
        ]
        .into_iter()
        .filter_map(|(keyword, is_set)| is_set.then_some(keyword))
        .collect();

        if let [first, second, ..] = populated[..] {
            return ConflictingStructureSnafu { first, second }.fail();
        }

        if let Some(properties) = &self.properties {
            self.expect_type("properties", SchemaType::Object)?;
            return Ok(SchemaShape::Object { properties });
        }

        if let Some(items) = &self.items {
            self.expect_type("items", SchemaType::Array)?;
            return Ok(SchemaShape::Array { items });
        }

        if let Some(values) = values {
            self.expect_type("additionalProperties", SchemaType::Object)?;
            return Ok(SchemaShape::Map { values });
        }

        Ok(SchemaShape::Primitive)
    }

    fn map_values(&self) -> Option<&Self> {
        self.additional_properties
            .as_ref()
            .and_then(AdditionalProperties::value_schema)
    }

    fn expect_type(&self, field: &'static str, expected: SchemaType) -> Result<(), ShapeError> {
        match self.schema_type {
            Some(schema_type) if schema_type != expected => {
                TypeMismatchSnafu { field, schema_type }.fail()
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    fn parse(input: &str) -> StructuralSchema {
        serde_yaml::from_str(input).expect("test schema is valid")
    }

    #[test]
    fn deserialize_openapi_fragment() {
        let schema = parse(indoc! {r#"
            type: object
            required: [image]
            x-kubernetes-preserve-unknown-fields: true
            properties:
              image:
                type: string
                description: Which image would you like to use for your service
                pattern: "^[a-z]"
              replicas:
                type: integer
                default: 1
                minimum: 0
              exposeType:
                type: string
                enum: [ClusterIP, NodePort]
        "#});

        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        assert_eq!(schema.required, BTreeSet::from(["image".to_owned()]));

        let properties = schema.properties.as_ref().expect("properties are set");
        assert_eq!(properties.len(), 3);
        assert_eq!(properties["replicas"].default, Some(Value::from(1)));
        assert_eq!(properties["replicas"].minimum, Some(0.0));
        assert_eq!(properties["image"].pattern.as_deref(), Some("^[a-z]"));
        assert_eq!(properties["exposeType"].enum_values.len(), 2);
    }

    #[test]
    fn additional_properties_flag_has_no_value_shape() {
        let schema = parse(indoc! {"
            type: object
            additionalProperties: true
        "});

        assert_eq!(
            schema.additional_properties,
            Some(AdditionalProperties::Allowed(true))
        );
        assert_eq!(schema.shape(), Ok(SchemaShape::Primitive));
    }

    #[test]
    fn shape_of_map() {
        let schema = parse(indoc! {"
            type: object
            additionalProperties:
              type: string
        "});

        let values = StructuralSchema {
            schema_type: Some(SchemaType::String),
            ..Default::default()
        };
        assert_eq!(schema.shape(), Ok(SchemaShape::Map { values: &values }));
    }

    #[rstest]
    #[case("type: string", Some(SchemaType::String))]
    #[case("properties: {}", Some(SchemaType::Object))]
    #[case("additionalProperties: {type: string}", Some(SchemaType::Object))]
    #[case("items: {type: string}", Some(SchemaType::Array))]
    #[case("description: anything", None)]
    fn effective_type(#[case] input: &str, #[case] expected: Option<SchemaType>) {
        assert_eq!(parse(input).effective_type(), expected);
    }

    #[rstest]
    #[case(
        "{type: object, properties: {}, additionalProperties: {type: string}}",
        ShapeError::ConflictingStructure { first: "properties", second: "additionalProperties" }
    )]
    #[case(
        "{type: array, items: {type: string}, properties: {}}",
        ShapeError::ConflictingStructure { first: "properties", second: "items" }
    )]
    #[case(
        "{type: string, items: {type: string}}",
        ShapeError::TypeMismatch { field: "items", schema_type: SchemaType::String }
    )]
    #[case(
        "{type: array, properties: {}}",
        ShapeError::TypeMismatch { field: "properties", schema_type: SchemaType::Array }
    )]
    #[case(
        "{type: integer, additionalProperties: {type: string}}",
        ShapeError::TypeMismatch { field: "additionalProperties", schema_type: SchemaType::Integer }
    )]
    fn invalid_shapes(#[case] input: &str, #[case] expected: ShapeError) {
        assert_eq!(parse(input).shape(), Err(expected));
    }
}
