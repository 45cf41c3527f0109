//! The UI parameter tree which is handed to the UI to render definition forms.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::SchemaType;

/// A single form field, possibly containing nested fields.
///
/// Trees are either derived from a [`StructuralSchema`](crate::schema::StructuralSchema) by the
/// [`Renderer`](crate::render::Renderer), or authored by users as sparse custom trees which are
/// then [merged](crate::merge::merge) onto the derived ones. Every field is therefore optional on
/// the wire.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiParameter {
    /// Position among the siblings, lower values are rendered first.
    #[serde(default)]
    pub sort: u32,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<Validate>,

    /// Identity of the field, unique among its siblings.
    #[serde(default)]
    pub json_key: String,

    /// Rendering hint, see [`UiType`] for the values derived from schemas.
    #[serde(default)]
    pub ui_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_parameter_group_option: Option<Vec<GroupOption>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_parameters: Vec<UiParameter>,

    /// Describes the values of a free-form map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_parameter: Option<Box<UiParameter>>,

    /// Marks free-form map containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

impl UiParameter {
    pub fn is_required(&self) -> bool {
        self.validate
            .as_ref()
            .is_some_and(|validate| validate.required)
    }
}

/// Validation rules and input helpers of a [`UiParameter`].
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validate {
    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ParameterOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// The value can not be changed once set. Never derived, only set by custom trees.
    #[serde(default)]
    pub immutable: bool,
}

/// One choice of a [`UiType::Select`] parameter.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct ParameterOption {
    pub label: String,
    pub value: Value,
}

#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default)]
    pub col_span: i32,
}

/// Groups several sub parameters under one label.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
pub struct GroupOption {
    pub label: String,

    #[serde(default)]
    pub keys: Vec<String>,
}

/// Shows, hides or disables a parameter depending on the value of a sibling.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub json_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,

    #[serde(default)]
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// The rendering hints derived from schemas.
///
/// Custom trees may use any other value, which is why [`UiParameter::ui_type`] is a plain
/// string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr)]
pub enum UiType {
    Input,
    Number,
    Switch,
    Select,
    Strings,
    Numbers,
    Structs,
    Group,
    #[strum(serialize = "KV")]
    Kv,
}

impl UiType {
    /// Picks the widget for a schema node.
    ///
    /// - `schema_type`: the effective type of the node
    /// - `has_options`: whether the node is an enum
    /// - `element_type`: the effective type of the array elements, if the node is an array
    /// - `has_properties`: whether the node declares at least one property
    pub fn derive(
        schema_type: Option<SchemaType>,
        has_options: bool,
        element_type: Option<SchemaType>,
        has_properties: bool,
    ) -> Self {
        if has_options {
            return Self::Select;
        }

        match schema_type {
            Some(SchemaType::Array) => match element_type {
                Some(SchemaType::Object) => Self::Structs,
                Some(SchemaType::Number | SchemaType::Integer) => Self::Numbers,
                _ => Self::Strings,
            },
            Some(SchemaType::Object) if has_properties => Self::Group,
            Some(SchemaType::Object) => Self::Kv,
            Some(SchemaType::Boolean) => Self::Switch,
            Some(SchemaType::Number | SchemaType::Integer) => Self::Number,
            Some(SchemaType::String) | None => Self::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some(SchemaType::String), true, None, false, UiType::Select)]
    #[case(Some(SchemaType::Integer), true, None, false, UiType::Select)]
    #[case(Some(SchemaType::Array), true, Some(SchemaType::String), false, UiType::Select)]
    #[case(Some(SchemaType::Array), false, Some(SchemaType::Object), false, UiType::Structs)]
    #[case(Some(SchemaType::Array), false, Some(SchemaType::Integer), false, UiType::Numbers)]
    #[case(Some(SchemaType::Array), false, Some(SchemaType::Number), false, UiType::Numbers)]
    #[case(Some(SchemaType::Array), false, Some(SchemaType::String), false, UiType::Strings)]
    #[case(Some(SchemaType::Array), false, None, false, UiType::Strings)]
    #[case(Some(SchemaType::Object), false, None, true, UiType::Group)]
    #[case(Some(SchemaType::Object), false, None, false, UiType::Kv)]
    #[case(Some(SchemaType::Boolean), false, None, false, UiType::Switch)]
    #[case(Some(SchemaType::Number), false, None, false, UiType::Number)]
    #[case(Some(SchemaType::Integer), false, None, false, UiType::Number)]
    #[case(Some(SchemaType::String), false, None, false, UiType::Input)]
    #[case(None, false, None, false, UiType::Input)]
    fn derive_ui_type(
        #[case] schema_type: Option<SchemaType>,
        #[case] has_options: bool,
        #[case] element_type: Option<SchemaType>,
        #[case] has_properties: bool,
        #[case] expected: UiType,
    ) {
        assert_eq!(
            UiType::derive(schema_type, has_options, element_type, has_properties),
            expected
        );
    }

    #[test]
    fn kv_keeps_its_wire_name() {
        assert_eq!(UiType::Kv.to_string(), "KV");
        assert_eq!("KV".parse::<UiType>(), Ok(UiType::Kv));
    }

    #[test]
    fn deserialize_sparse_custom_parameter() {
        let parameters: Vec<UiParameter> = serde_yaml::from_str(indoc! {r#"
            - jsonKey: image
              uiType: ImageInput
              validate:
                required: true
                immutable: true
            - jsonKey: ports
              sort: 5
              subParameters:
                - jsonKey: port
                  style:
                    colSpan: 12
              conditions:
                - jsonKey: exposeType
                  op: "=="
                  value: NodePort
        "#})
        .expect("test YAML is valid");

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].ui_type, "ImageInput");
        assert_eq!(parameters[0].label, "");
        assert_eq!(parameters[0].sort, 0);
        assert!(parameters[0].is_required());
        assert_eq!(parameters[1].sub_parameters[0].style, Some(Style { col_span: 12 }));
        assert_eq!(
            parameters[1].conditions,
            Some(vec![Condition {
                json_key: "exposeType".to_owned(),
                op: Some("==".to_owned()),
                value: Value::from("NodePort"),
                action: None,
            }])
        );
    }

    #[test]
    fn serialize_omits_empty_fields() {
        let parameter = UiParameter {
            json_key: "replicas".to_owned(),
            label: "Replicas".to_owned(),
            ui_type: UiType::Number.to_string(),
            sort: 100,
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&parameter).expect("parameter serializes"),
            serde_json::json!({
                "sort": 100,
                "label": "Replicas",
                "description": "",
                "jsonKey": "replicas",
                "uiType": "Number",
            })
        );
    }
}
