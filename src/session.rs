use std::fmt;

use chrono::Utc;
use uuid::Uuid;

/// Opaque token correlating this client with whatever conversational
/// context the service keeps server-side.
///
/// Generated once per run; the service may hand back its own id in a chat
/// reply, which then replaces the local one. A conversation clear keeps
/// the current id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh id in the `session_<millis>_<suffix>` format.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let entropy = Uuid::new_v4().simple().to_string();
        // 9 chars of hex entropy is plenty for one id per run
        SessionId(format!("session_{}_{}", millis, &entropy[..9]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Replace the local id with a server-assigned one. Returns whether
    /// anything changed; empty or identical values are ignored.
    pub fn adopt(&mut self, server_id: &str) -> bool {
        if server_id.is_empty() || server_id == self.0 {
            return false;
        }
        self.0 = server_id.to_string();
        true
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
