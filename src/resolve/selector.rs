//! Label selectors.
//!
//! A [`Selector`] is a conjunction of requirements over a label map. It can
//! be built from a workload's `LabelSelector` or from a service's plain
//! `spec.selector` map, evaluated against labels, and formatted in the
//! canonical `kubectl` form used to compare two selectors for equivalence.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type Labels = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Operator {
    Equals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Requirement {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported operator {operator:?} for key {key:?}")]
pub struct InvalidSelector {
    key: String,
    operator: String,
}

// === Selector ===

impl Selector {
    /// Equality requirements for every entry of `map`.
    pub fn from_map(map: &Labels) -> Self {
        let requirements = map
            .iter()
            .map(|(k, v)| Requirement {
                key: k.clone(),
                operator: Operator::Equals,
                values: Some(v.clone()).into_iter().collect(),
            })
            .collect();
        Self::sorted(requirements)
    }

    pub fn from_label_selector(selector: &LabelSelector) -> Result<Self, InvalidSelector> {
        let mut requirements = match &selector.match_labels {
            Some(map) => Self::from_map(map).requirements,
            None => Vec::new(),
        };

        for expr in selector.match_expressions.iter().flatten() {
            let operator = match expr.operator.as_str() {
                "In" => Operator::In,
                "NotIn" => Operator::NotIn,
                "Exists" => Operator::Exists,
                "DoesNotExist" => Operator::DoesNotExist,
                other => {
                    return Err(InvalidSelector {
                        key: expr.key.clone(),
                        operator: other.to_string(),
                    })
                }
            };
            requirements.push(Requirement {
                key: expr.key.clone(),
                operator,
                values: expr.values.iter().flatten().cloned().collect(),
            });
        }

        Ok(Self::sorted(requirements))
    }

    fn sorted(mut requirements: Vec<Requirement>) -> Self {
        requirements.sort_by(|a, b| a.key.cmp(&b.key));
        Self { requirements }
    }

    /// An empty selector has no requirements. It is never used to match:
    /// callers treat it as "selects nothing".
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", requirement)?;
        }
        Ok(())
    }
}

// === Requirement ===

impl Requirement {
    fn matches(&self, labels: &Labels) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::Equals | Operator::In => value.is_some_and(|v| self.values.contains(v)),
            Operator::NotIn => !value.is_some_and(|v| self.values.contains(v)),
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = || self.values.iter().cloned().collect::<Vec<_>>().join(",");
        match self.operator {
            Operator::Equals => write!(f, "{}={}", self.key, values()),
            Operator::In => write!(f, "{} in ({})", self.key, values()),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, values()),
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelectorRequirement;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn expression(key: &str, operator: &str, values: &[&str]) -> LabelSelectorRequirement {
        LabelSelectorRequirement {
            key: key.into(),
            operator: operator.into(),
            values: Some(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    #[test]
    fn test_matches() {
        let app_web = Selector::from_map(&labels(&[("app", "web")]));
        let tier = Selector::from_label_selector(&LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![
                expression("tier", "In", &["frontend", "edge"]),
                expression("canary", "DoesNotExist", &[]),
                expression("env", "NotIn", &["dev"]),
            ]),
        })
        .unwrap();

        for (selector, labels, matches, msg) in [
            (&app_web, labels(&[("app", "web")]), true, "exact label match"),
            (&app_web, labels(&[("app", "web"), ("tier", "frontend")]), true, "sufficient label match"),
            (&app_web, labels(&[("app", "api")]), false, "value mismatch"),
            (&app_web, labels(&[]), false, "missing key"),
            (&tier, labels(&[("tier", "edge")]), true, "expression match"),
            (&tier, labels(&[("tier", "edge"), ("env", "prod")]), true, "notin other value"),
            (&tier, labels(&[("tier", "edge"), ("env", "dev")]), false, "notin excluded value"),
            (&tier, labels(&[("tier", "edge"), ("canary", "true")]), false, "does not exist"),
            (&tier, labels(&[("tier", "backend")]), false, "in mismatch"),
        ] {
            assert_eq!(selector.matches(&labels), matches, "{}", msg);
        }
    }

    #[test]
    fn test_empty_selector() {
        assert!(Selector::from_map(&Labels::new()).is_empty());
        assert!(Selector::from_label_selector(&LabelSelector::default()).unwrap().is_empty());
        assert!(!Selector::from_map(&labels(&[("app", "web")])).is_empty());
    }

    #[test]
    fn test_canonical_format() {
        let selector = Selector::from_label_selector(&LabelSelector {
            match_labels: Some(labels(&[("tier", "web"), ("app", "shop")])),
            match_expressions: Some(vec![
                expression("env", "In", &["prod", "canary"]),
                expression("zone", "NotIn", &["b", "a"]),
                expression("managed", "Exists", &[]),
                expression("legacy", "DoesNotExist", &[]),
            ]),
        })
        .unwrap();

        assert_eq!(
            selector.to_string(),
            "app=shop,env in (canary,prod),!legacy,managed,tier=web,zone notin (a,b)"
        );
    }

    #[test]
    fn test_map_and_label_selector_format_identically() {
        let map = labels(&[("b", "2"), ("a", "1")]);
        let from_workload = Selector::from_label_selector(&LabelSelector {
            match_labels: Some(map.clone()),
            match_expressions: None,
        })
        .unwrap();
        assert_eq!(from_workload.to_string(), Selector::from_map(&map).to_string());
        assert_eq!(from_workload.to_string(), "a=1,b=2");
    }

    #[test]
    fn test_unknown_operator() {
        let err = Selector::from_label_selector(&LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![expression("app", "Gt", &["1"])]),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "unsupported operator \"Gt\" for key \"app\"");
    }
}
