//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of the `/proc` files the
//! agent samples. They are designed to be easily testable with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Aggregate CPU tick counters from the `cpu` line of `/proc/stat`.
///
/// Both counters are cumulative jiffies and monotonically non-decreasing
/// across consecutive reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTicks {
    /// Ticks spent doing work (everything but idle and iowait).
    pub busy: u64,
    /// Total ticks accounted across all states.
    pub total: u64,
}

/// Parses the aggregate `cpu` line of `/proc/stat` into a busy/total pair.
///
/// Fields: user nice system idle iowait irq softirq steal. Guest time is
/// already accounted in user/nice and is not summed again. iowait and later
/// fields may be absent on old kernels and default to 0.
pub fn parse_cpu_ticks(content: &str) -> Result<CpuTicks, ParseError> {
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() != Some(&"cpu") {
            continue;
        }

        if parts.len() < 5 {
            return Err(ParseError::new(format!(
                "short cpu line: expected 4+ fields, got {}",
                parts.len() - 1
            )));
        }

        let get_val =
            |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        let idle = get_val(4);
        let iowait = get_val(5);
        let total: u64 = (1..=8).map(get_val).sum();

        return Ok(CpuTicks {
            busy: total - idle - iowait,
            total,
        });
    }

    Err(ParseError::new("missing aggregate cpu line"))
}

/// Total and free memory from `/proc/meminfo`, in KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemKib {
    pub total: u64,
    pub free: u64,
}

/// Parses `MemTotal` and `MemFree` out of `/proc/meminfo` content.
///
/// Enforces the probe contract `total >= free > 0`.
pub fn parse_meminfo(content: &str) -> Result<MemKib, ParseError> {
    let parse_kb = |line: &str| -> u64 {
        line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    let mut mem = MemKib::default();
    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            mem.total = parse_kb(line);
        } else if line.starts_with("MemFree:") {
            mem.free = parse_kb(line);
        }
    }

    if mem.free == 0 || mem.total < mem.free {
        return Err(ParseError::new(format!(
            "implausible meminfo: total={} free={}",
            mem.total, mem.free
        )));
    }

    Ok(mem)
}
