//! Label selectors restricting which definitions are listed.
use std::{collections::BTreeMap, fmt::Display};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::{
    consts::{DEPRECATED_LABEL, SCOPE_APPLICATION, SCOPE_LABEL, SCOPE_WORKFLOW_RUN, UI_HIDDEN_LABEL},
    kind::DefinitionType,
};

pub type Result<T, E = SelectorError> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
pub enum SelectorError {
    #[snafu(display("label selector with set operator {operator:?} must have values"))]
    SetOperatorWithoutValues { operator: String },

    #[snafu(display("label selector with existence operator {operator:?} must not have values"))]
    ExistenceOperatorWithValues { operator: String },

    #[snafu(display("label selector has an invalid operator {operator:?}"))]
    InvalidOperator { operator: String },
}

/// Restricts the definitions returned by
/// [`DefinitionService::list_definitions`](crate::service::DefinitionService::list_definitions).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionQuery {
    #[serde(rename = "type")]
    pub definition_type: String,

    /// Only keep definitions applicable to this workload type. Empty keeps all.
    #[serde(default)]
    pub applied_workloads: String,

    /// Only keep definitions installed by this addon. Empty keeps all.
    #[serde(default, rename = "sourceAddon")]
    pub owner_addon: String,

    /// Include definitions hidden from the UI.
    #[serde(default)]
    pub query_all: bool,

    /// Either `Application` or `WorkflowRun`. Empty keeps both.
    #[serde(default)]
    pub scope: String,
}

impl DefinitionQuery {
    pub fn new(definition_type: DefinitionType) -> Self {
        Self {
            definition_type: definition_type.to_string(),
            ..Default::default()
        }
    }

    /// The label selector sent along with the list request.
    pub fn label_selector(&self) -> LabelSelector {
        let mut requirements = vec![does_not_exist(DEPRECATED_LABEL)];

        if !self.scope.is_empty() {
            let excluded_scope = if self.scope == SCOPE_APPLICATION {
                SCOPE_WORKFLOW_RUN
            } else {
                SCOPE_APPLICATION
            };
            requirements.push(LabelSelectorRequirement {
                key: SCOPE_LABEL.to_owned(),
                operator: "NotIn".to_owned(),
                values: Some(vec![excluded_scope.to_owned()]),
            });
        }

        if !self.query_all {
            requirements.push(does_not_exist(UI_HIDDEN_LABEL));
        }

        LabelSelector {
            match_expressions: Some(requirements),
            match_labels: None,
        }
    }
}

/// The cache key of a query. The scope is not part of it.
impl Display for DefinitionQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type:{}/appliedWorkloads:{}/ownerAddon:{}/queryAll:{}",
            self.definition_type, self.applied_workloads, self.owner_addon, self.query_all
        )
    }
}

fn does_not_exist(key: &str) -> LabelSelectorRequirement {
    LabelSelectorRequirement {
        key: key.to_owned(),
        operator: "DoesNotExist".to_owned(),
        values: None,
    }
}

enum Requirement<'a> {
    In(&'a [String]),
    NotIn(&'a [String]),
    Exists,
    DoesNotExist,
}

impl<'a> Requirement<'a> {
    fn parse(requirement: &'a LabelSelectorRequirement) -> Result<Self> {
        let operator = requirement.operator.as_str();
        let values = requirement.values.as_deref().unwrap_or_default();

        match operator {
            "In" | "NotIn" if values.is_empty() => SetOperatorWithoutValuesSnafu { operator }.fail(),
            "In" => Ok(Self::In(values)),
            "NotIn" => Ok(Self::NotIn(values)),
            "Exists" | "DoesNotExist" if !values.is_empty() => {
                ExistenceOperatorWithValuesSnafu { operator }.fail()
            }
            "Exists" => Ok(Self::Exists),
            "DoesNotExist" => Ok(Self::DoesNotExist),
            _ => InvalidOperatorSnafu { operator }.fail(),
        }
    }

    fn to_query_string(&self, key: &str) -> String {
        match self {
            Self::In(values) => format!("{key} in ({})", values.join(", ")),
            Self::NotIn(values) => format!("{key} notin ({})", values.join(", ")),
            Self::Exists => key.to_owned(),
            Self::DoesNotExist => format!("!{key}"),
        }
    }

    fn matches(&self, value: Option<&String>) -> bool {
        match self {
            Self::In(values) => value.is_some_and(|value| values.contains(value)),
            Self::NotIn(values) => value.is_none_or(|value| !values.contains(value)),
            Self::Exists => value.is_some(),
            Self::DoesNotExist => value.is_none(),
        }
    }
}

/// Extends [`LabelSelector`] with its query string form and local evaluation.
pub trait LabelSelectorExt {
    /// Converts the selector into the form used by Kubernetes list calls, for example
    /// `app=web,tier in (a, b),!legacy`.
    fn to_query_string(&self) -> Result<String>;

    /// Evaluates the selector against a set of labels the way the API server does.
    fn matches(&self, labels: &BTreeMap<String, String>) -> Result<bool>;
}

impl LabelSelectorExt for LabelSelector {
    fn to_query_string(&self) -> Result<String> {
        let match_labels = self
            .match_labels
            .iter()
            .flatten()
            .map(|(key, value)| Ok(format!("{key}={value}")));
        let match_expressions = self.match_expressions.iter().flatten().map(|requirement| {
            Requirement::parse(requirement).map(|parsed| parsed.to_query_string(&requirement.key))
        });

        let parts = match_labels
            .chain(match_expressions)
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(","))
    }

    fn matches(&self, labels: &BTreeMap<String, String>) -> Result<bool> {
        let labels_match = self
            .match_labels
            .iter()
            .flatten()
            .all(|(key, value)| labels.get(key) == Some(value));
        if !labels_match {
            return Ok(false);
        }

        for requirement in self.match_expressions.iter().flatten() {
            if !Requirement::parse(requirement)?.matches(labels.get(&requirement.key)) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn requirement(key: &str, operator: &str, values: Option<&[&str]>) -> LabelSelectorRequirement {
        LabelSelectorRequirement {
            key: key.to_owned(),
            operator: operator.to_owned(),
            values: values.map(|values| values.iter().map(|v| (*v).to_owned()).collect()),
        }
    }

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn query_string() {
        let selector = LabelSelector {
            match_labels: Some(labels(&[("foo", "bar"), ("hui", "buh")])),
            match_expressions: Some(vec![
                requirement("foo", "In", Some(&["quick", "bar"])),
                requirement("foo", "NotIn", Some(&["quick", "bar"])),
                requirement("foo", "Exists", None),
                requirement("foo", "DoesNotExist", Some(&[])),
            ]),
        };

        assert_eq!(
            selector.to_query_string(),
            Ok("foo=bar,hui=buh,foo in (quick, bar),foo notin (quick, bar),foo,!foo".to_owned())
        );
        assert_eq!(LabelSelector::default().to_query_string(), Ok(String::new()));
    }

    #[rstest]
    #[case(
        requirement("foo", "In", None),
        SelectorError::SetOperatorWithoutValues { operator: "In".to_owned() }
    )]
    #[case(
        requirement("foo", "NotIn", Some(&[])),
        SelectorError::SetOperatorWithoutValues { operator: "NotIn".to_owned() }
    )]
    #[case(
        requirement("foo", "Exists", Some(&["bar"])),
        SelectorError::ExistenceOperatorWithValues { operator: "Exists".to_owned() }
    )]
    #[case(
        requirement("foo", "Equals", None),
        SelectorError::InvalidOperator { operator: "Equals".to_owned() }
    )]
    fn invalid_requirements(
        #[case] requirement: LabelSelectorRequirement,
        #[case] expected: SelectorError,
    ) {
        let selector = LabelSelector {
            match_expressions: Some(vec![requirement]),
            match_labels: None,
        };

        assert_eq!(selector.to_query_string(), Err(expected.clone()));
        assert_eq!(selector.matches(&BTreeMap::new()), Err(expected));
    }

    #[rstest]
    #[case(&[], true)]
    #[case(&[("app", "web")], true)]
    #[case(&[(DEPRECATED_LABEL, "true")], false)]
    #[case(&[(UI_HIDDEN_LABEL, "true")], false)]
    #[case(&[(SCOPE_LABEL, "Application")], true)]
    #[case(&[(SCOPE_LABEL, "WorkflowRun")], false)]
    fn default_query_selector(#[case] pairs: &[(&str, &str)], #[case] expected: bool) {
        let query = DefinitionQuery {
            scope: "Application".to_owned(),
            ..DefinitionQuery::new(DefinitionType::Trait)
        };

        assert_eq!(query.label_selector().matches(&labels(pairs)), Ok(expected));
    }

    #[rstest]
    #[case("", &[(SCOPE_LABEL, "WorkflowRun")], true)]
    #[case("WorkflowRun", &[(SCOPE_LABEL, "WorkflowRun")], true)]
    #[case("WorkflowRun", &[(SCOPE_LABEL, "Application")], false)]
    #[case("Other", &[(SCOPE_LABEL, "Application")], false)]
    fn scoped_query_selector(
        #[case] scope: &str,
        #[case] pairs: &[(&str, &str)],
        #[case] expected: bool,
    ) {
        let query = DefinitionQuery {
            scope: scope.to_owned(),
            query_all: true,
            ..DefinitionQuery::new(DefinitionType::WorkflowStep)
        };

        assert_eq!(query.label_selector().matches(&labels(pairs)), Ok(expected));
    }

    #[test]
    fn query_all_keeps_hidden_definitions() {
        let query = DefinitionQuery {
            query_all: true,
            ..DefinitionQuery::new(DefinitionType::Component)
        };

        assert_eq!(
            query.label_selector().to_query_string(),
            Ok(format!("!{DEPRECATED_LABEL}"))
        );
        assert_eq!(
            DefinitionQuery::new(DefinitionType::Component)
                .label_selector()
                .to_query_string(),
            Ok(format!("!{DEPRECATED_LABEL},!{UI_HIDDEN_LABEL}"))
        );
    }

    #[test]
    fn cache_key() {
        let query = DefinitionQuery {
            applied_workloads: "deployments.apps".to_owned(),
            owner_addon: "fluxcd".to_owned(),
            scope: "Application".to_owned(),
            ..DefinitionQuery::new(DefinitionType::Trait)
        };

        assert_eq!(
            query.to_string(),
            "type:trait/appliedWorkloads:deployments.apps/ownerAddon:fluxcd/queryAll:false"
        );
    }
}
