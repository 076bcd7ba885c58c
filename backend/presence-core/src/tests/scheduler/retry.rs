// Unit tests for the login retry backoffs

use crate::scheduler::{LinearBackoff, Limited};

use std::time::Duration;

use backoff::backoff::{Backoff, Constant};

#[test]
fn given_linear_backoff_when_next_backoff_then_grows_by_step() {
    let mut backoff = LinearBackoff::new(Duration::from_secs(1));

    assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
    assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(2)));
    assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(3)));

    backoff.reset();
    assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
}

/// **VALUE**: Verifies retry limits are enforced on top of an unbounded backoff.
///
/// **WHY THIS MATTERS**: Login retries must be bounded so a tick cannot block
/// forever while the presence app is closed.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one giving N+1 retries.
#[test]
fn given_limited_backoff_when_retries_exhausted_then_returns_none() {
    // GIVEN: A constant backoff limited to two retries
    let mut backoff = Limited::new(Constant::new(Duration::from_millis(500)), 2);

    // WHEN/THEN: Two delays, then none
    assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(500)));
    assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(500)));
    assert_eq!(backoff.next_backoff(), None);

    backoff.reset();
    assert!(backoff.next_backoff().is_some());
}

#[test]
fn given_zero_retries_when_next_backoff_then_none_immediately() {
    let mut backoff = Limited::new(LinearBackoff::new(Duration::from_secs(1)), 0);

    assert_eq!(backoff.next_backoff(), None);
}
