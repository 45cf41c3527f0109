//! The two orderings applied to sibling parameters.
//!
//! [`order_by_derivation`] runs once when a tree is derived from a schema and assigns the
//! [`sort`](UiParameter::sort) values. [`sort_by_position`] runs after custom trees have been
//! merged and only looks at those (possibly overridden) values. The two must stay separate: a
//! custom `sort` has to win over the derived order.
use std::cmp::Ordering;

use crate::parameter::UiParameter;

/// The `sort` value of the first parameter of every sibling set.
pub const BASE_SORT: u32 = 100;

/// Orders freshly derived siblings and numbers them starting at `base_sort`.
///
/// 1. Required parameters come first.
/// 2. Parameters with fewer sub parameters come first.
/// 3. Otherwise, parameters are ordered by label.
///
/// Only the given level is touched. Nested levels are ordered when they are derived.
pub fn order_by_derivation(parameters: &mut [UiParameter], base_sort: u32) {
    parameters.sort_by(derivation_order);

    for (position, parameter) in parameters.iter_mut().enumerate() {
        parameter.sort = base_sort.saturating_add(position as u32);
    }
}

/// Orders siblings by their `sort` value, keeping the current order for equal values.
pub fn sort_by_position(parameters: &mut [UiParameter]) {
    parameters.sort_by_key(|parameter| parameter.sort);
}

fn derivation_order(a: &UiParameter, b: &UiParameter) -> Ordering {
    b.is_required()
        .cmp(&a.is_required())
        .then_with(|| a.sub_parameters.len().cmp(&b.sub_parameters.len()))
        .then_with(|| a.label.cmp(&b.label))
}
