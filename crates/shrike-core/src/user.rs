use serde::{Deserialize, Serialize};

/// Identity attached to delivered events.
///
/// All fields are optional; the id may be filled in by the anonymous
/// identity manager when no explicit id is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_default_is_empty() {
        let user = User::default();
        assert!(user.id.is_none());
        assert!(user.name.is_none());
        assert!(user.email.is_none());
    }

    #[test]
    fn test_user_serialization_skips_missing_fields() {
        let user = User::with_id("abc123");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "abc123" }));
    }
}
