//! Merges sparse custom UI parameter trees onto default trees.
use std::collections::HashMap;

use crate::{order, parameter::UiParameter};

/// A value which can be amended by a sparse custom counterpart.
///
/// The custom value only replaces `self` if it carries information, that is if it is not empty,
/// not zero or not [`None`] respectively. This is the reverse direction of a merge with defaults:
/// `self` is the default and stays in place unless overridden.
pub trait Overlay {
    fn overlay(&mut self, custom: Self);
}

impl Overlay for String {
    fn overlay(&mut self, custom: Self) {
        if !custom.is_empty() {
            *self = custom;
        }
    }
}

impl Overlay for u32 {
    fn overlay(&mut self, custom: Self) {
        if custom != 0 {
            *self = custom;
        }
    }
}

impl<T> Overlay for Option<T> {
    fn overlay(&mut self, custom: Self) {
        if custom.is_some() {
            *self = custom;
        }
    }
}

impl Overlay for UiParameter {
    /// Overrides the presentation fields of `self` with the ones set in `custom`.
    ///
    /// `json_key` and `additional_parameter` always stay untouched. Sub parameters are merged
    /// recursively using [`merge`].
    fn overlay(&mut self, custom: Self) {
        let Self {
            sort,
            label,
            description,
            validate,
            json_key: _,
            ui_type,
            style,
            sub_parameter_group_option,
            sub_parameters,
            additional_parameter: _,
            additional,
            disable,
            conditions,
        } = custom;

        self.description.overlay(description);
        self.label.overlay(label);
        self.sub_parameter_group_option
            .overlay(sub_parameter_group_option);
        self.validate.overlay(validate);
        self.ui_type.overlay(ui_type);
        self.disable.overlay(disable);
        self.sub_parameters = merge(std::mem::take(&mut self.sub_parameters), sub_parameters);
        self.sort.overlay(sort);
        self.additional.overlay(additional);
        self.style.overlay(style);
        self.conditions.overlay(conditions);
    }
}

/// Merges `custom_tree` onto `default_tree`.
///
/// Parameters are matched by [`json_key`](UiParameter::json_key) on every level. The result has
/// the shape of `default_tree`: custom parameters without a default counterpart are dropped. The
/// only exception is an empty `default_tree` (for example because the definition has no schema),
/// in which case `custom_tree` is returned as is.
///
/// After merging, every level is ordered by the (possibly overridden) `sort` values.
///
/// ```
/// use vela_uischema::{merge, parameter::UiParameter};
///
/// let default_tree = vec![UiParameter {
///     json_key: "replicas".to_owned(),
///     label: "Replicas".to_owned(),
///     sort: 100,
///     ..Default::default()
/// }];
/// let custom_tree = vec![UiParameter {
///     json_key: "replicas".to_owned(),
///     description: "Number of pods".to_owned(),
///     ..Default::default()
/// }];
///
/// let merged = merge(default_tree, custom_tree);
///
/// assert_eq!(merged[0].label, "Replicas");
/// assert_eq!(merged[0].description, "Number of pods");
/// assert_eq!(merged[0].sort, 100);
/// ```
pub fn merge(default_tree: Vec<UiParameter>, custom_tree: Vec<UiParameter>) -> Vec<UiParameter> {
    if default_tree.is_empty() {
        return custom_tree;
    }

    let mut custom_by_key: HashMap<String, UiParameter> = custom_tree
        .into_iter()
        .map(|custom| (custom.json_key.clone(), custom))
        .collect();

    let mut merged = default_tree;
    for parameter in &mut merged {
        if let Some(custom) = custom_by_key.remove(&parameter.json_key) {
            parameter.overlay(custom);
        }
    }

    order::sort_by_position(&mut merged);
    merged
}
