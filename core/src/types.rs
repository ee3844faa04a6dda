//! Domain records for the todo service.
//!
//! # Design
//! Decoding is lenient: every field falls back to its zero value when absent
//! or `null`, so a create payload only needs `message` and `user_id` and an update
//! payload only needs `id` and `message`. The store assigns `id` and both
//! timestamps; whatever the caller sends for them on create is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A message-bearing task owned by a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToDo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An externally provisioned user. Read-only from this service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_with_wire_field_names() {
        let todo = ToDo {
            id: 7,
            message: "buy milk".to_string(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            updated_at: DateTime::from_timestamp(1_700_000_060, 0).unwrap(),
            user_id: 1,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["message"], "buy milk");
        assert_eq!(json["created_at"], "2023-11-14T22:13:20Z");
        assert_eq!(json["updated_at"], "2023-11-14T22:14:20Z");
        assert_eq!(json["user_id"], 1);
    }

    #[test]
    fn create_payload_defaults_missing_fields() {
        let todo: ToDo = serde_json::from_str(r#"{"message":"m","user_id":3}"#).unwrap();
        assert_eq!(todo.id, 0);
        assert_eq!(todo.message, "m");
        assert_eq!(todo.user_id, 3);
        assert_eq!(todo.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn update_payload_needs_only_id_and_message() {
        let todo: ToDo = serde_json::from_str(r#"{"id":42,"message":"new"}"#).unwrap();
        assert_eq!(todo.id, 42);
        assert_eq!(todo.message, "new");
        assert_eq!(todo.user_id, 0);
    }

    #[test]
    fn empty_object_decodes_to_default() {
        let todo: ToDo = serde_json::from_str("{}").unwrap();
        assert_eq!(todo, ToDo::default());
    }

    #[test]
    fn null_fields_decode_to_zero_values() {
        let todo: ToDo = serde_json::from_str(
            r#"{"id":1,"message":null,"created_at":null,"updated_at":null,"user_id":null}"#,
        )
        .unwrap();
        assert_eq!(todo.id, 1);
        assert!(todo.message.is_empty());
        assert_eq!(todo.created_at, DateTime::<Utc>::default());
        assert_eq!(todo.user_id, 0);
    }

    #[test]
    fn wrongly_typed_field_is_rejected() {
        let result: Result<ToDo, _> = serde_json::from_str(r#"{"id":"seven"}"#);
        assert!(result.is_err());
    }
}
