//! Lustre per-target collector over the `obdfilter` proc tree.
//!
//! Each Object Storage Target exports its counters as small files under
//! `{lustre}/obdfilter/<target>/`. Targets can be deactivated at any moment,
//! so every per-target read can race with the target vanishing; that case is
//! reported as `CollectError::TargetGone` rather than a plain I/O error.

pub mod parser;

use crate::collector::CollectError;
use crate::collector::traits::FileSystem;
use parser::{parse_counter, parse_stats_rwbytes};
use std::io;
use std::path::Path;

pub use parser::RwBytes;

/// Collects per-target counters from `{lustre}/obdfilter/`.
pub struct LustreCollector<F: FileSystem> {
    fs: F,
    lustre_path: String,
}

impl<F: FileSystem> LustreCollector<F> {
    /// Creates a new Lustre collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `lustre_path` - Base path to the Lustre proc tree (usually
    ///   "/proc/fs/lustre")
    pub fn new(fs: F, lustre_path: impl Into<String>) -> Self {
        Self {
            fs,
            lustre_path: lustre_path.into(),
        }
    }

    /// Enumerates OST names, sorted for a stable emission order.
    ///
    /// A host without the `obdfilter` tree (no OST role) reports an empty
    /// list, not an error.
    pub fn ost_list(&self) -> Result<Vec<String>, CollectError> {
        let dir = format!("{}/obdfilter", self.lustre_path);
        let dir = Path::new(&dir);
        if !self.fs.exists(dir) {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = self
            .fs
            .read_dir(dir)?
            .into_iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            // obdfilter holds one directory per target plus a num_refs file
            .filter(|n| n != "num_refs" && !n.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Reads the target's UUID.
    pub fn ost_uuid(&self, name: &str) -> Result<String, CollectError> {
        let content = self.read_target_file(name, "uuid")?;
        let uuid = content.trim();
        if uuid.is_empty() {
            return Err(CollectError::Parse(format!("empty uuid for {}", name)));
        }
        Ok(uuid.to_string())
    }

    /// Reads the target's free/total inode counts.
    pub fn ost_files(&self, name: &str) -> Result<(u64, u64), CollectError> {
        Ok((
            self.read_target_counter(name, "filesfree")?,
            self.read_target_counter(name, "filestotal")?,
        ))
    }

    /// Reads the target's free/total space in KiB.
    pub fn ost_kbytes(&self, name: &str) -> Result<(u64, u64), CollectError> {
        Ok((
            self.read_target_counter(name, "kbytesfree")?,
            self.read_target_counter(name, "kbytestotal")?,
        ))
    }

    /// Reads the target's cumulative read/write byte counters.
    pub fn ost_rwbytes(&self, name: &str) -> Result<RwBytes, CollectError> {
        let content = self.read_target_file(name, "stats")?;
        parse_stats_rwbytes(&content).map_err(|e| CollectError::Parse(e.message))
    }

    fn read_target_file(&self, name: &str, file: &str) -> Result<String, CollectError> {
        let path = format!("{}/obdfilter/{}/{}", self.lustre_path, name, file);
        self.fs
            .read_to_string(Path::new(&path))
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => CollectError::TargetGone(name.to_string()),
                _ => CollectError::Io(e),
            })
    }

    fn read_target_counter(&self, name: &str, file: &str) -> Result<u64, CollectError> {
        let content = self.read_target_file(name, file)?;
        parse_counter(&content)
            .map_err(|e| CollectError::Parse(format!("{}/{}: {}", name, file, e.message)))
    }
}
