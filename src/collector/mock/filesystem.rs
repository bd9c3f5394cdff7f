//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to simulate an OSS node's proc tree on any platform.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files and directories in memory, allowing tests to simulate
/// various `/proc` and `obdfilter` states without a Lustre server.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();

        // Add parent directories
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.directories.insert(path.clone());

        // Add parent directories
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Removes a file or directory tree, as if the target vanished.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.retain(|p, _| !p.starts_with(path));
        self.directories.retain(|p| !p.starts_with(path));
    }

    /// Adds an OST with all its typical `obdfilter/<name>/` files.
    ///
    /// # Arguments
    /// * `name` - Target directory name
    /// * `uuid` - Content of the `uuid` file (without newline)
    /// * `files_free`/`files_total` - Inode counters
    /// * `kbytes_free`/`kbytes_total` - Space counters in KiB
    /// * `read_bytes`/`write_bytes` - Cumulative I/O sums for the `stats` file
    #[allow(clippy::too_many_arguments)]
    pub fn add_ost_target(
        &mut self,
        name: &str,
        uuid: &str,
        files_free: u64,
        files_total: u64,
        kbytes_free: u64,
        kbytes_total: u64,
        read_bytes: u64,
        write_bytes: u64,
    ) {
        let base = PathBuf::from(format!("/proc/fs/lustre/obdfilter/{}", name));
        self.add_dir(&base);
        self.add_file(base.join("uuid"), format!("{}\n", uuid));
        self.add_file(base.join("filesfree"), format!("{}\n", files_free));
        self.add_file(base.join("filestotal"), format!("{}\n", files_total));
        self.add_file(base.join("kbytesfree"), format!("{}\n", kbytes_free));
        self.add_file(base.join("kbytestotal"), format!("{}\n", kbytes_total));
        self.add_file(
            base.join("stats"),
            format!(
                "snapshot_time             1723022176.123456 secs.usecs\n\
                 read_bytes                100 samples [bytes] 4096 1048576 {}\n\
                 write_bytes               100 samples [bytes] 4096 1048576 {}\n",
                read_bytes, write_bytes
            ),
        );
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        // Find all files and directories that are direct children
        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}
