//! Local wall-clock access.
//!
//! All expiry decisions in this workspace are made against the *store*
//! clock ([`DocumentStore::server_now_ms`]); the local clock exists only as
//! the reference point for the clock-offset sanity check.
//!
//! [`DocumentStore::server_now_ms`]: crate::DocumentStore::server_now_ms

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Get the local Unix timestamp in milliseconds.
///
/// Returns 0 if system time is before the UNIX epoch, which prevents panics
/// on grossly misconfigured hosts.
#[inline]
pub fn local_now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_now_ms_is_nonzero() {
        assert!(local_now_ms() > 0);
    }

    #[test]
    fn local_now_ms_is_monotonic() {
        let t1 = local_now_ms();
        let t2 = local_now_ms();
        assert!(t2 >= t1, "time should not go backwards");
    }
}
