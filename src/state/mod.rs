//! Per-domain containers holding the cached copy of server entities.
//!
//! Every mutating operation takes the API and the session explicitly, awaits one
//! remote call, and applies the outcome to the container's own fields only.

pub mod calendar;
pub mod goals;
pub mod insights;
pub mod journal;
pub mod reflection;
pub mod week;

use std::time::{Duration, Instant};

use crate::api::ApiError;

/// How long success markers and notifications stay visible
pub const FLASH_DURATION: Duration = Duration::from_secs(3);

/// A marker that is raised by a successful save and clears itself after [`FLASH_DURATION`]
#[derive(Debug, Default, Clone)]
pub struct SuccessFlag {
    raised_at: Option<Instant>,
}

impl SuccessFlag {
    pub fn raise(&mut self) {
        self.raised_at = Some(Instant::now());
    }

    pub fn clear(&mut self) {
        self.raised_at = None;
    }

    pub fn is_set(&self) -> bool {
        self.raised_at.is_some()
    }

    /// Clear the flag once it has been visible long enough
    pub fn expire(&mut self, now: Instant) {
        if let Some(at) = self.raised_at {
            if now.saturating_duration_since(at) >= FLASH_DURATION {
                self.raised_at = None;
            }
        }
    }
}

/// Record a failure in a container's `error` field and hand it back to the caller
pub(crate) fn record_error(slot: &mut Option<String>, err: ApiError) -> ApiError {
    *slot = Some(err.to_string());
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_flag_expires_after_flash_duration() {
        let mut flag = SuccessFlag::default();
        flag.raise();
        flag.expire(Instant::now());
        assert!(flag.is_set());

        flag.expire(Instant::now() + FLASH_DURATION + Duration::from_millis(10));
        assert!(!flag.is_set());
    }
}
