use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Boolean filter over occurrence record fields.
///
/// Serializes to the GBIF occurrence search predicate shape:
/// `{"type":"isNotNull","parameter":..}`, `{"type":"equals","key":..,"value":..}`
/// and `{"type":"and"|"or","predicates":[..]}`.
///
/// An `And` with no children is always true and an `Or` with no children is
/// always false, the identities of the two operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Predicate {
    #[serde(rename = "isNotNull")]
    Exists {
        #[serde(rename = "parameter")]
        field: String,
    },
    #[serde(rename = "equals")]
    Equals {
        #[serde(rename = "key")]
        field: String,
        value: Value,
    },
    #[serde(rename = "and")]
    And {
        #[serde(rename = "predicates")]
        children: Vec<Predicate>,
    },
    #[serde(rename = "or")]
    Or {
        #[serde(rename = "predicates")]
        children: Vec<Predicate>,
    },
}

pub fn exists(field: impl Into<String>) -> Predicate {
    Predicate::Exists {
        field: field.into(),
    }
}

pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Predicate {
    Predicate::Equals {
        field: field.into(),
        value: value.into(),
    }
}

pub fn is_true(field: impl Into<String>) -> Predicate {
    equals(field, true)
}

pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::And {
        children: predicates.into_iter().collect(),
    }
}

pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::Or {
        children: predicates.into_iter().collect(),
    }
}

/// At least one of `fields` is populated.
pub fn basic_or<I, S>(fields: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    or(fields.into_iter().map(exists))
}

impl Predicate {
    /// Evaluates the predicate against a single record.
    ///
    /// A field counts as present when the key exists and is not `null`.
    /// `Equals` on an absent field is false, so `is_true` does not
    /// distinguish "absent" from "false".
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        match self {
            Predicate::Exists { field } => record.get(field).is_some_and(|value| !value.is_null()),
            Predicate::Equals { field, value } => record.get(field) == Some(value),
            Predicate::And { children } => children.iter().all(|child| child.matches(record)),
            Predicate::Or { children } => children.iter().any(|child| child.matches(record)),
        }
    }
}
