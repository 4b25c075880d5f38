use std::sync::LazyLock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Low 12 bits of every id; starts at a random offset per process
static SEQUENCE: LazyLock<AtomicI64> = LazyLock::new(|| {
    use rand::Rng;
    AtomicI64::new(rand::thread_rng().gen_range(0..0x1000))
});

/// Generate a Snowflake-style i64 row id.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC
///   - 12 bits: process-wide sequence (4096 distinct ids per ms)
pub fn snowflake_id() -> i64 {
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let ts = (now_millis() - EPOCH_MS) & 0x1FF_FFFF_FFFF;
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xFFF;
    (ts << 12) | seq
}
