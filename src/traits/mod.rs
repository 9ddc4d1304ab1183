//! Trait definitions for mockable dependencies.
//!
//! This module defines:
//! - [`TimeProvider`]: Time abstraction for testing
//!
//! # Mocking
//!
//! Traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use shop_diagnostics::traits::{TimeProvider, RealTimeProvider};
//!
//! let time_provider = RealTimeProvider;
//! let now = time_provider.now();
//! println!("Current time: {now}");
//! ```

use chrono::{DateTime, Utc};

/// Time provider trait for deterministic testing.
///
/// Read paths that filter by age ask this for "now" instead of the system
/// clock.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
///
/// This is the production implementation that returns the actual current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use static_assertions::assert_impl_all;

    assert_impl_all!(RealTimeProvider: Send, Sync, Clone, Copy, Default);

    #[test]
    fn test_real_time_provider_now() {
        let provider = RealTimeProvider;
        let before = Utc::now();
        let now = provider.now();
        let after = Utc::now();
        assert!(now >= before);
        assert!(now <= after);
    }

    #[test]
    fn test_mock_time_provider() {
        let fixed = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut mock = MockTimeProvider::new();
        mock.expect_now().times(2).return_const(fixed);

        assert_eq!(mock.now(), fixed);
        assert_eq!(mock.now(), fixed);
    }

    #[test]
    fn test_time_provider_as_trait_object() {
        let provider: Box<dyn TimeProvider> = Box::new(RealTimeProvider);
        let diff = Utc::now() - provider.now();
        assert!(diff.num_seconds() < 1);
    }
}
