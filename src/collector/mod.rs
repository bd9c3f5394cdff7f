//! Counter probes for the OST telemetry agent.
//!
//! This module provides the probes that feed one sampling cycle: OS-level
//! counters from `/proc` and per-target Lustre counters from the `obdfilter`
//! tree, with support for mocking for testing off-host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        OstSampler                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  SystemCollector    │   │     LustreCollector         │  │
//! │  │  - /proc/stat       │   │  - obdfilter/<target>/uuid  │  │
//! │  │  - /proc/meminfo    │   │  - .../files*, kbytes*      │  │
//! │  │  - kernel/hostname  │   │  - .../stats                │  │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘  │
//! │             │                             │                 │
//! │             └──────────────┬──────────────┘                 │
//! │                            │                                │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!                      ┌───────┴───────┐
//!                      │               │
//!               ┌──────▼──────┐ ┌──────▼──────┐
//!               │   RealFs    │ │   MockFs    │
//!               │ (Linux)     │ │ (Testing)   │
//!               └─────────────┘ └─────────────┘
//! ```

pub mod lustre;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use lustre::LustreCollector;
pub use mock::MockFs;
pub use procfs::SystemCollector;
pub use traits::{FileSystem, RealFs};

/// Error type for probe failures.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading a counter source.
    Io(std::io::Error),
    /// A counter source did not match its expected schema.
    Parse(String),
    /// A named target disappeared between enumeration and per-target reads.
    TargetGone(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
            CollectError::TargetGone(name) => write!(f, "target {} disappeared", name),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}
