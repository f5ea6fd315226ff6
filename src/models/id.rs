use std::str::FromStr;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataError;

/// Caller-supplied article identifier.
///
/// The API is inconsistent about id types: the same article can come back with
/// `id: 42`, `id: "42"` or `_id: "42"`. Equality against server data therefore
/// goes through [`ArticleId::matches`], which compares loosely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[serde(untagged)]
pub enum ArticleId {
    #[display("{_0}")]
    Num(i64),
    #[display("{_0}")]
    Text(String),
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl FromStr for ArticleId {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DataError::invalid_value("id", s));
        }
        Ok(trimmed
            .parse::<i64>()
            .map(Self::Num)
            .unwrap_or_else(|_| Self::Text(trimmed.to_string())))
    }
}

impl ArticleId {
    /// Reads the id of a server record from `id` or `_id`.
    pub fn from_record(record: &Value) -> Result<Self, DataError> {
        let raw = ["id", "_id"]
            .iter()
            .find_map(|key| record.get(*key).filter(|v| !v.is_null()))
            .ok_or_else(|| DataError::missing_field("id"))?;
        match raw {
            Value::Number(n) => n
                .as_i64()
                .map(Self::Num)
                .ok_or_else(|| DataError::invalid_value("id", n.to_string())),
            Value::String(s) => s.parse(),
            _ => Err(DataError::invalid_type("id", "string or integer")),
        }
    }

    /// Loose equality against a scalar id or a record carrying `id`/`_id`.
    pub fn matches(&self, value: &Value) -> bool {
        match value {
            Value::Object(map) => ["id", "_id"]
                .iter()
                .filter_map(|key| map.get(*key))
                .any(|v| self.matches_scalar(v)),
            other => self.matches_scalar(other),
        }
    }

    /// Two strings compare exactly; numeric coercion applies only when one side
    /// is a number.
    fn matches_scalar(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Text(ours), Value::String(theirs)) => ours.trim() == theirs.trim(),
            (Self::Num(ours), Value::Number(theirs)) => {
                theirs.as_i64() == Some(*ours) || theirs.as_f64() == Some(*ours as f64)
            }
            (Self::Num(ours), Value::String(theirs)) => coerce_number(theirs) == Some(*ours as f64),
            (Self::Text(ours), Value::Number(theirs)) => {
                ours.trim() == theirs.to_string() || coerce_number(ours) == theirs.as_f64()
            }
            _ => false,
        }
    }
}

fn coerce_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}
