//! System collector for gathering OS-level counters from `/proc/`.

use crate::collector::CollectError;
use crate::collector::procfs::parser::{CpuTicks, MemKib, parse_cpu_ticks, parse_meminfo};
use crate::collector::traits::FileSystem;
use std::path::Path;

/// Collects host-wide counters from `/proc/`.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Reads the aggregate CPU tick pair from `/proc/stat`.
    pub fn collect_cpu_ticks(&self) -> Result<CpuTicks, CollectError> {
        let path = format!("{}/stat", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        parse_cpu_ticks(&content).map_err(|e| CollectError::Parse(e.message))
    }

    /// Reads total/free memory from `/proc/meminfo`.
    pub fn collect_mem(&self) -> Result<MemKib, CollectError> {
        let path = format!("{}/meminfo", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        parse_meminfo(&content).map_err(|e| CollectError::Parse(e.message))
    }

    /// Reads the host name from `/proc/sys/kernel/hostname`.
    pub fn collect_hostname(&self) -> Result<String, CollectError> {
        let path = format!("{}/sys/kernel/hostname", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        Ok(content.trim().to_string())
    }
}
