use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// A candidate row from a business table, as returned by the storage layer.
///
/// Field accessors return `None` for anything missing or mistyped so a malformed
/// row can only fail a guard, never panic the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtectedRow(Map<String, Value>);

impl ProtectedRow {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn uuid_field(&self, field: &str) -> Option<Uuid> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(Value::as_bool)
    }
}

impl From<Map<String, Value>> for ProtectedRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Customer id -> owning auth user id, loaded once per request for join-based ownership
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerIndex(HashMap<Uuid, Uuid>);

impl OwnerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, customer_id: Uuid, user_id: Uuid) {
        self.0.insert(customer_id, user_id);
    }

    pub fn owner_of(&self, customer_id: Uuid) -> Option<Uuid> {
        self.0.get(&customer_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Uuid, Uuid)> for OwnerIndex {
    fn from_iter<I: IntoIterator<Item = (Uuid, Uuid)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_ignore_mistyped_fields() {
        let row = ProtectedRow::from_value(json!({
            "user_id": "not-a-uuid",
            "customer_id": 42,
            "is_available": "yes",
        }))
        .unwrap();

        assert_eq!(row.uuid_field("user_id"), None);
        assert_eq!(row.uuid_field("customer_id"), None);
        assert_eq!(row.bool_field("is_available"), None);
        assert_eq!(row.uuid_field("missing"), None);
    }

    #[test]
    fn non_object_values_are_not_rows() {
        assert!(ProtectedRow::from_value(json!([1, 2])).is_none());
        assert!(ProtectedRow::from_value(json!(null)).is_none());
    }
}
