use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// A contact record: a generated `id` plus whatever fields the client sent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Contact {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), fields }
    }

    /// Shallow merge: fields in `patch` overwrite existing ones, `id` stays.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        self.fields.extend(patch);
    }
}

/// Validate a request body and strip any client-supplied `id`.
pub fn body_fields(body: Value) -> Result<Map<String, Value>, ServiceError> {
    let Value::Object(mut fields) = body else {
        return Err(ServiceError::Validation("missing fields".into()));
    };
    fields.remove("id");
    if fields.is_empty() {
        return Err(ServiceError::Validation("missing fields".into()));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_flat_with_id() {
        let c = Contact { id: "AeHIrLTr6JkxGE6SN-0Rw".into(), fields: body_fields(json!({"name": "Allen Raymond", "phone": "(992) 914-3792"})).unwrap() };
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({"id": "AeHIrLTr6JkxGE6SN-0Rw", "name": "Allen Raymond", "phone": "(992) 914-3792"})
        );
    }

    #[test]
    fn body_fields_rejects_non_objects_and_empty() {
        assert!(body_fields(json!([1, 2])).is_err());
        assert!(body_fields(json!({})).is_err());
        assert!(body_fields(json!({"id": "x"})).is_err());
        let f = body_fields(json!({"id": "x", "name": "n"})).unwrap();
        assert!(!f.contains_key("id"));
    }

    #[test]
    fn merge_overwrites_and_keeps_id() {
        let mut c = Contact::new(body_fields(json!({"name": "a", "email": "a@x.io"})).unwrap());
        let id = c.id.clone();
        c.merge(body_fields(json!({"email": "b@x.io", "favorite": true})).unwrap());
        assert_eq!(c.id, id);
        assert_eq!(c.fields["name"], "a");
        assert_eq!(c.fields["email"], "b@x.io");
        assert_eq!(c.fields["favorite"], true);
    }
}
