//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic proc-tree states for an Object Storage
//! Server in various conditions.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical OSS node with two active targets.
    pub fn typical_oss() -> Self {
        let mut fs = Self::oss_base();

        fs.add_ost_target(
            "fs-OST0000",
            "fs-OST0000_UUID",
            1000000,
            2000000,
            52428800,
            104857600,
            4987613184,
            1399618797,
        );
        fs.add_ost_target(
            "fs-OST0001",
            "fs-OST0001_UUID",
            1500000,
            2000000,
            78643200,
            104857600,
            913438722,
            2236962048,
        );

        fs
    }

    /// Creates an OSS node with one target that has seen no I/O since mount.
    pub fn idle_oss() -> Self {
        let mut fs = Self::oss_base();

        let base = "/proc/fs/lustre/obdfilter/fs-OST0000";
        fs.add_dir(base);
        fs.add_file(format!("{}/uuid", base), "fs-OST0000_UUID\n");
        fs.add_file(format!("{}/filesfree", base), "2000000\n");
        fs.add_file(format!("{}/filestotal", base), "2000000\n");
        fs.add_file(format!("{}/kbytesfree", base), "104857600\n");
        fs.add_file(format!("{}/kbytestotal", base), "104857600\n");
        // A freshly mounted target has no read_bytes/write_bytes lines yet
        fs.add_file(
            format!("{}/stats", base),
            "snapshot_time             1723022176.123456 secs.usecs\n",
        );

        fs
    }

    /// Creates a host with the Lustre tree present but no OSTs configured.
    pub fn no_targets() -> Self {
        let mut fs = Self::oss_base();
        fs.add_dir("/proc/fs/lustre/obdfilter");
        fs
    }

    /// OS-level files shared by all scenarios.
    fn oss_base() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/sys/kernel/hostname", "oss01\n");
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );

        fs
    }
}
