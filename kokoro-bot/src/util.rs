//! Small shared utilities.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix timestamp in milliseconds.
#[must_use]
pub fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Generate a fresh opaque session token.
///
/// Tokens are v4 UUIDs, so they are unique for the lifetime of the process
/// and carry no meaning beyond identity.
#[must_use]
pub fn generate_session_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_monotonic_enough() {
        let a = timestamp_ms();
        let b = timestamp_ms();
        assert!(a > 0);
        assert!(b >= a);
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
