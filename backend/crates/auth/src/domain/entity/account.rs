//! Account Entity
//!
//! The durable account record and its lockout state machine.
//!
//! An account is either OPEN (failure count below the threshold, no
//! active lock) or LOCKED (`locked_until` lies in the future). The
//! transitions are pure functions on [`LockoutState`]; the repository
//! applies the same transition atomically in SQL so concurrent failed
//! attempts never lose an increment. A lock that has expired is OPEN for
//! the very attempt that observes it - expiry needs no separate event.

use chrono::{DateTime, Duration, Utc};
use kernel::id::AccountId;

use crate::domain::value_object::{
    credential::Credential, display_name::DisplayName, email::Email,
};

/// Account entity
///
/// Created at registration, mutated only by login attempts and password
/// changes, never deleted by this core.
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal key; leaves the process only through the boundary codec
    pub account_id: AccountId,
    /// Login and contact address
    pub email: Email,
    /// Name shown next to reviews
    pub display_name: DisplayName,
    /// Argon2id password hash
    pub password_hash: Credential,
    /// Consecutive login failure count
    pub failed_login_count: u16,
    /// Account locked until (temporary lockout after failures)
    pub locked_until: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check if the account is currently locked
    pub fn is_locked(&self) -> bool {
        self.lockout().is_locked_at(Utc::now())
    }

    /// Remaining lock time, if an active lock exists
    pub fn lock_remaining(&self) -> Option<Duration> {
        self.lockout().remaining_at(Utc::now())
    }

    /// Current counter/lock pair as a value
    pub fn lockout(&self) -> LockoutState {
        LockoutState {
            failed_count: self.failed_login_count,
            locked_until: self.locked_until,
        }
    }
}

/// Account data prior to insertion (the database assigns the key)
#[derive(Debug)]
pub struct NewAccount {
    pub email: Email,
    pub display_name: DisplayName,
    pub password_hash: Credential,
}

/// The counter/lock pair driving the lockout state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutState {
    /// Consecutive failures recorded so far
    pub failed_count: u16,
    /// Lock expiry instant, if a lock was ever set
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutState {
    /// State of a fresh account
    pub fn open() -> Self {
        Self {
            failed_count: 0,
            locked_until: None,
        }
    }

    /// Whether a lock is active at `now`
    ///
    /// An expired lock does not count: the state is OPEN for the same
    /// attempt that observes the expiry.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(until) => now < until,
            None => false,
        }
    }

    /// Remaining lock time at `now`, if a lock is active
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.locked_until.filter(|until| now < *until).map(|until| until - now)
    }

    /// Transition for a recorded failed attempt
    ///
    /// Every failure increments the counter, locked or not. Crossing the
    /// threshold while no lock is active starts a new lock; an active
    /// lock is never extended by further attempts.
    pub fn after_failure(&self, now: DateTime<Utc>, threshold: u16, lock_duration: Duration) -> Self {
        let failed_count = self.failed_count.saturating_add(1);

        let locked_until = if !self.is_locked_at(now) && failed_count >= threshold {
            Some(now + lock_duration)
        } else {
            self.locked_until
        };

        Self {
            failed_count,
            locked_until,
        }
    }

    /// Transition for a successful login while unlocked
    pub fn after_success(&self) -> Self {
        Self::open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u16 = 5;

    fn lock_duration() -> Duration {
        Duration::hours(2)
    }

    #[test]
    fn test_open_until_threshold() {
        let now = Utc::now();
        let mut state = LockoutState::open();

        for expected in 1..THRESHOLD {
            state = state.after_failure(now, THRESHOLD, lock_duration());
            assert_eq!(state.failed_count, expected);
            assert!(!state.is_locked_at(now), "locked after {expected} failures");
        }
    }

    #[test]
    fn test_threshold_crossing_sets_lock() {
        let now = Utc::now();
        let mut state = LockoutState::open();

        for _ in 0..THRESHOLD {
            state = state.after_failure(now, THRESHOLD, lock_duration());
        }

        assert_eq!(state.failed_count, 5);
        assert!(state.is_locked_at(now));
        assert_eq!(state.locked_until, Some(now + lock_duration()));

        // One minute later the lock still holds
        assert!(state.is_locked_at(now + Duration::minutes(1)));
        // After the full duration it no longer does
        assert!(!state.is_locked_at(now + lock_duration()));
    }

    #[test]
    fn test_attempt_while_locked_is_recorded_without_extending() {
        let now = Utc::now();
        let mut state = LockoutState::open();
        for _ in 0..THRESHOLD {
            state = state.after_failure(now, THRESHOLD, lock_duration());
        }
        let lock = state.locked_until;

        let later = now + Duration::minutes(10);
        let state = state.after_failure(later, THRESHOLD, lock_duration());

        assert_eq!(state.failed_count, 6);
        assert_eq!(state.locked_until, lock, "active lock must not move");
    }

    #[test]
    fn test_expired_lock_falls_through_to_open_handling() {
        let now = Utc::now();
        let mut state = LockoutState::open();
        for _ in 0..THRESHOLD {
            state = state.after_failure(now, THRESHOLD, lock_duration());
        }

        // Past the lock, another failure re-locks immediately because the
        // counter is still above the threshold
        let after_expiry = now + lock_duration() + Duration::minutes(1);
        assert!(!state.is_locked_at(after_expiry));

        let state = state.after_failure(after_expiry, THRESHOLD, lock_duration());
        assert_eq!(state.failed_count, 6);
        assert_eq!(state.locked_until, Some(after_expiry + lock_duration()));
    }

    #[test]
    fn test_success_resets_counter_and_lock() {
        let now = Utc::now();
        let mut state = LockoutState::open();
        state = state.after_failure(now, THRESHOLD, lock_duration());
        state = state.after_failure(now, THRESHOLD, lock_duration());

        let state = state.after_success();
        assert_eq!(state, LockoutState::open());
    }

    #[test]
    fn test_remaining_at() {
        let now = Utc::now();
        let state = LockoutState {
            failed_count: 5,
            locked_until: Some(now + Duration::hours(2)),
        };

        assert_eq!(state.remaining_at(now), Some(Duration::hours(2)));
        assert_eq!(state.remaining_at(now + Duration::hours(3)), None);
    }
}
