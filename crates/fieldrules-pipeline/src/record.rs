//! Client record

use serde::{Deserialize, Serialize};

/// One client row
///
/// Input rows carry `id`, `name` and `age`; `ageCategory` is filled in by
/// the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub age: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_category: Option<String>,
}

impl Client {
    pub fn new(id: i64, name: impl Into<String>, age: i64) -> Self {
        Self {
            id,
            name: Some(name.into()),
            age: Some(age),
            age_category: None,
        }
    }
}
