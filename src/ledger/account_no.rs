//! Account number generation.
//!
//! Account numbers are 10-digit numeric strings sampled uniformly from the
//! full `0000000000..=9999999999` space. Uniqueness is enforced by the
//! store's unique index; a colliding insert surfaces as
//! [`LedgerError::Conflict`](crate::ledger::LedgerError::Conflict) and the
//! caller retries with a fresh sample, up to [`MAX_ATTEMPTS`] with
//! multiplicative backoff, then gives up with `AccountNoExhausted`.

use rand::Rng;
use std::time::Duration;

pub const ACCOUNT_NO_LEN: usize = 10;

/// Retry cap for collision-and-regenerate. With ~10^10 candidate numbers a
/// second collision in a row already means something is wrong with the store.
pub const MAX_ATTEMPTS: u32 = 8;

/// Sample a candidate account number.
pub fn generate() -> String {
    let n: u64 = rand::thread_rng().gen_range(0..=9_999_999_999);
    format!("{:010}", n)
}

/// Backoff before retry `attempt` (0-based), doubling per attempt.
pub fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(5u64 << attempt.min(6))
}
