use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One monitoring session. Plugins are loaded for the lifetime of an
/// active session and destroyed when it pauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_have_unique_ids() {
        assert_ne!(Session::new().id, Session::new().id);
    }
}
