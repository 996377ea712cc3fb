use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category of a breadcrumb record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreadcrumbType {
    Error,
    Log,
    Manual,
    Navigation,
    Process,
    Request,
    State,
    User,
}

impl BreadcrumbType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreadcrumbType::Error => "error",
            BreadcrumbType::Log => "log",
            BreadcrumbType::Manual => "manual",
            BreadcrumbType::Navigation => "navigation",
            BreadcrumbType::Process => "process",
            BreadcrumbType::Request => "request",
            BreadcrumbType::State => "state",
            BreadcrumbType::User => "user",
        }
    }
}

impl std::fmt::Display for BreadcrumbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped record of an operation, attached to events for context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(rename = "type")]
    pub kind: BreadcrumbType,
    pub timestamp: DateTime<Utc>,
}

impl Breadcrumb {
    /// Build a breadcrumb stamped with the current time.
    pub fn new(
        message: impl Into<String>,
        metadata: Option<Map<String, Value>>,
        kind: BreadcrumbType,
    ) -> Self {
        Self {
            message: message.into(),
            metadata: metadata.unwrap_or_default(),
            kind,
            timestamp: Utc::now(),
        }
    }

    /// A `manual`-typed breadcrumb, the default for user-initiated records.
    pub fn manual(message: impl Into<String>) -> Self {
        Self::new(message, None, BreadcrumbType::Manual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_serializes_lowercase() {
        let json = serde_json::to_string(&BreadcrumbType::Navigation).unwrap();
        assert_eq!(json, "\"navigation\"");
    }

    #[test]
    fn test_manual_breadcrumb_defaults() {
        let crumb = Breadcrumb::manual("clicked save");
        assert_eq!(crumb.kind, BreadcrumbType::Manual);
        assert!(crumb.metadata.is_empty());
        assert_eq!(crumb.message, "clicked save");
    }

    #[test]
    fn test_breadcrumb_wire_shape() {
        let crumb = Breadcrumb::new("boom", None, BreadcrumbType::Error);
        let json = serde_json::to_value(&crumb).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "boom");
        assert!(json.get("metadata").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_breadcrumb_roundtrip_keeps_metadata() {
        let mut metadata = Map::new();
        metadata.insert("path".to_string(), Value::String("/checkout".into()));
        let crumb = Breadcrumb::new("navigated", Some(metadata), BreadcrumbType::Navigation);

        let json = serde_json::to_string(&crumb).unwrap();
        let back: Breadcrumb = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata["path"], "/checkout");
        assert_eq!(back.kind, BreadcrumbType::Navigation);
    }
}
