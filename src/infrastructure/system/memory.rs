//! Available memory detection for sizing the memory tier.

/// Share of available memory given to decoded images (1/8).
pub const DEFAULT_MEMORY_FRACTION: usize = 8;

/// Lower bound on the derived budget (8 MiB).
pub const MIN_MEMORY_BUDGET: usize = 8 * 1024 * 1024;

/// Detect available system memory in bytes.
///
/// # Platform Support
///
/// - **Linux**: Parses `MemAvailable` (or `MemTotal`) from `/proc/meminfo`
/// - **Other platforms**: Returns fallback of 1GB
#[cfg(target_os = "linux")]
#[must_use]
pub fn detect_available_memory() -> usize {
    std::fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|content| {
            parse_meminfo(&content, "MemAvailable:").or_else(|| parse_meminfo(&content, "MemTotal:"))
        })
        .unwrap_or_else(fallback_memory)
}

#[cfg(not(target_os = "linux"))]
#[must_use]
pub fn detect_available_memory() -> usize {
    fallback_memory()
}

/// Budget for the memory tier: `available / fraction`, floored at
/// [`MIN_MEMORY_BUDGET`]. Computed once at startup.
#[must_use]
pub fn memory_budget(available: usize, fraction: usize) -> usize {
    (available / fraction.max(1)).max(MIN_MEMORY_BUDGET)
}

/// Format: `"MemAvailable:   16384000 kB"`.
fn parse_meminfo(content: &str, key: &str) -> Option<usize> {
    content
        .lines()
        .find(|line| line.starts_with(key))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<usize>().ok())
        .map(|kb| kb * 1024)
}

const fn fallback_memory() -> usize {
    1024 * 1024 * 1024
}
