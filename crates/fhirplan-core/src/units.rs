//! Unit conversion helpers shared by alarm thresholds and timing constants.

/// Convert megabytes to bytes. Alarm thresholds on memory/storage metrics
/// are expressed in bytes by the provider.
pub fn mb_to_bytes(mb: u64) -> u64 {
    mb * 1024 * 1024
}

/// Seconds, as-is. Exists so call sites read as durations.
pub fn secs(n: u32) -> u32 {
    n
}

/// Minutes expressed in seconds.
pub fn minutes(n: u32) -> u32 {
    n * 60
}
