use crate::Config;

/// Identity attached to every API call. There is no login flow: the user id
/// comes from configuration (or a CLI override) and lives for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
}

impl Session {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.user_id)
    }

    /// Value sent in the `X-User-Id` header
    pub fn header_value(&self) -> String {
        self.user_id.to_string()
    }
}
