use crate::breadcrumb::Breadcrumb;
use crate::feature_flags::FeatureFlagSet;
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw error as handed to `notify` or captured from a global signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_class: String,
    pub message: String,
}

impl ErrorReport {
    pub fn new(error_class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_class: error_class.into(),
            message: message.into(),
        }
    }

    /// Capture class and message from any std error.
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        Self::new("Error", error.to_string())
    }
}

impl From<&str> for ErrorReport {
    fn from(message: &str) -> Self {
        Self::new("Error", message)
    }
}

impl From<String> for ErrorReport {
    fn from(message: String) -> Self {
        Self::new("Error", message)
    }
}

/// Application context stamped on every event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_stage: Option<String>,
}

/// Device context stamped on every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
}

impl DeviceInfo {
    pub fn capture() -> Self {
        Self {
            time: Utc::now(),
            os_name: Some(std::env::consts::OS.to_string()),
        }
    }
}

/// The enriched representation of a single error occurrence, ready for
/// delivery. Mutable until handed to the transport.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub api_key: String,
    pub exceptions: Vec<ErrorReport>,
    pub app: AppInfo,
    pub device: DeviceInfo,
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(skip_serializing_if = "FeatureFlagSet::is_empty")]
    pub feature_flags: FeatureFlagSet,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Event {
    /// Look up a top-level metadata section.
    pub fn metadata_section(&self, section: &str) -> Option<&Value> {
        self.metadata.get(section)
    }

    /// Add or replace a metadata section on this event only.
    pub fn add_metadata(&mut self, section: impl Into<String>, value: Value) {
        self.metadata.insert(section.into(), value);
    }

    pub fn add_feature_flag(&mut self, name: impl Into<String>, variant: Option<String>) {
        self.feature_flags.add(name, variant);
    }

    pub fn set_user(&mut self, user: User) {
        self.user = user;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breadcrumb::BreadcrumbType;

    fn sample_event() -> Event {
        Event {
            api_key: "key-123".to_string(),
            exceptions: vec![ErrorReport::new("TypeError", "x is not a function")],
            app: AppInfo {
                app_type: Some("worker".to_string()),
                version: Some("1.2.3".to_string()),
                release_stage: Some("production".to_string()),
            },
            device: DeviceInfo::capture(),
            breadcrumbs: vec![Breadcrumb::new("hello", None, BreadcrumbType::Log)],
            feature_flags: FeatureFlagSet::new(),
            metadata: Map::new(),
            user: User::default(),
            context: Some("checkout".to_string()),
        }
    }

    #[test]
    fn test_error_report_from_str() {
        let report: ErrorReport = "something broke".into();
        assert_eq!(report.error_class, "Error");
        assert_eq!(report.message, "something broke");
    }

    #[test]
    fn test_event_wire_shape_is_camel_case() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["apiKey"], "key-123");
        assert_eq!(json["app"]["type"], "worker");
        assert_eq!(json["app"]["releaseStage"], "production");
        assert_eq!(json["exceptions"][0]["errorClass"], "TypeError");
        assert_eq!(json["context"], "checkout");
        // Empty collections stay off the wire.
        assert!(json.get("featureFlags").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_event_metadata_mutation() {
        let mut event = sample_event();
        event.add_metadata("request", serde_json::json!({ "id": 7 }));
        assert_eq!(
            event.metadata_section("request").unwrap()["id"],
            serde_json::json!(7)
        );
    }

    #[test]
    fn test_event_feature_flags_serialize() {
        let mut event = sample_event();
        event.add_feature_flag("checkout-v2", Some("treatment".to_string()));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["featureFlags"][0]["featureFlag"], "checkout-v2");
        assert_eq!(json["featureFlags"][0]["variant"], "treatment");
    }
}
