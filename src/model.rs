//! Decoded OST record value types.
//!
//! These structures hold the result of decoding a v2 OST record. They are
//! plain owned values: the decoder's caller keeps them without any callback
//! or borrow tied to the input string.

use serde::{Deserialize, Serialize};

/// Counters for a single Object Storage Target.
///
/// One entry corresponds to one `obdfilter` target on the reporting host.
/// All counters are cumulative values as exposed by the target's proc files.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct OstEntry {
    /// Target UUID, e.g. `fs-OST0000_UUID`.
    /// Source: `obdfilter/<target>/uuid`
    pub name: String,

    /// Free inodes on the target.
    /// Source: `obdfilter/<target>/filesfree`
    pub inodes_free: u64,

    /// Total inodes on the target.
    /// Source: `obdfilter/<target>/filestotal`
    pub inodes_total: u64,

    /// Free space in KiB.
    /// Source: `obdfilter/<target>/kbytesfree`
    pub kbytes_free: u64,

    /// Total space in KiB.
    /// Source: `obdfilter/<target>/kbytestotal`
    pub kbytes_total: u64,

    /// Cumulative bytes read from the target.
    /// Source: `read_bytes` sum in `obdfilter/<target>/stats`
    pub read_bytes: u64,

    /// Cumulative bytes written to the target.
    /// Source: `write_bytes` sum in `obdfilter/<target>/stats`
    pub write_bytes: u64,
}

/// A fully decoded v2 OST record.
///
/// `entries` preserves the order in which the emitter enumerated its targets.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct OstRecord {
    /// Reporting host name.
    pub host: String,

    /// CPU utilization over the emitter's sampling interval, percent.
    pub cpu_pct: f32,

    /// Memory utilization at sampling time, percent.
    pub mem_pct: f32,

    /// Per-target counters, in emitter order.
    pub entries: Vec<OstEntry>,
}
