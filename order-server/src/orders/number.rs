//! Order number generation

use rand::Rng;

/// Produces human-facing order numbers. Uniqueness is enforced by the
/// database; a collision surfaces as a retryable conflict.
pub trait OrderNumberSource: Send + Sync {
    fn next_number(&self, now_millis: i64) -> String;
}

/// Millisecond timestamp followed by four random digits
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampNumbers;

impl OrderNumberSource for TimestampNumbers {
    fn next_number(&self, now_millis: i64) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
        format!("{now_millis}{suffix:04}")
    }
}
