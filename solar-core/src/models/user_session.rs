use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in identity-service session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub uid: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl UserSession {
    pub fn is_expired_at(
        &self,
        now: DateTime<Utc>,
    ) -> bool {
        now >= self.expires_at
    }
}
