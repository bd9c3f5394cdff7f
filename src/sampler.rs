//! Stateful sampling: CPU differencing and per-cycle record emission.
//!
//! This module is the single owner of cross-cycle state. CPU utilization is
//! a differential between two consecutive `/proc/stat` readings, so the
//! [`CpuDifferencer`] keeps the last two samples; everything else in a cycle
//! is a point-in-time read. The [`OstSampler`] drives one full cycle:
//! enumerate targets, probe host/cpu/memory, probe each target, encode.

use crate::codec::{self, DEFAULT_RECORD_CAPACITY, EncodeError};
use crate::collector::procfs::parser::{CpuTicks, MemKib};
use crate::collector::{CollectError, FileSystem, LustreCollector, SystemCollector};
use crate::model::OstEntry;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Error type for a failed sampling cycle.
#[derive(Debug)]
pub enum SampleError {
    /// A probe failed; carries the probe's own failure kind.
    Collect(CollectError),
    /// The record could not be encoded.
    Encode(EncodeError),
    /// The CPU differencer has fewer than two valid consecutive samples.
    NotReady,
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Collect(e) => write!(f, "{}", e),
            SampleError::Encode(e) => write!(f, "{}", e),
            SampleError::NotReady => write!(f, "cpu utilization not ready yet"),
        }
    }
}

impl std::error::Error for SampleError {}

impl From<CollectError> for SampleError {
    fn from(e: CollectError) -> Self {
        SampleError::Collect(e)
    }
}

impl From<EncodeError> for SampleError {
    fn from(e: EncodeError) -> Self {
        SampleError::Encode(e)
    }
}

/// Successful outcome of one sampling cycle.
///
/// An OSS with no configured targets yields `Empty`: nothing to report, and
/// deliberately not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleOutcome {
    /// A complete encoded record.
    Emitted(String),
    /// No targets configured; emission suppressed for this cycle.
    Empty,
}

// ---------------------------------------------------------------------------
// CPU differencing
// ---------------------------------------------------------------------------

/// Computes CPU utilization from consecutive tick readings.
///
/// Holds the last two samples in a two-slot shift register plus a count of
/// how many of them came from successful consecutive probes. A percentage
/// is available only with two valid samples; a single failed probe demotes
/// the state by one, so one subsequent success is enough to recover.
#[derive(Debug, Clone, Default)]
pub struct CpuDifferencer {
    busy: [u64; 2],
    total: [u64; 2],
    /// Number of valid samples, 0..=2.
    valid: u8,
}

impl CpuDifferencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one probe result and returns the utilization percentage when
    /// two valid consecutive samples are available.
    ///
    /// `None` covers warm-up, a degraded state after a probe failure, and a
    /// zero total-tick delta (no time elapsed between readings); a NaN is
    /// never produced.
    pub fn update(&mut self, reading: Option<CpuTicks>) -> Option<f64> {
        self.busy[0] = self.busy[1];
        self.total[0] = self.total[1];

        match reading {
            Some(ticks) => {
                self.busy[1] = ticks.busy;
                self.total[1] = ticks.total;
                if self.valid < 2 {
                    self.valid += 1;
                }
            }
            None => {
                if self.valid > 0 {
                    self.valid -= 1;
                }
            }
        }

        if self.valid < 2 {
            return None;
        }

        // Counter wrap is modular by contract
        let dt = self.total[1].wrapping_sub(self.total[0]);
        if dt == 0 {
            return None;
        }
        let db = self.busy[1].wrapping_sub(self.busy[0]);
        Some(db as f64 / dt as f64 * 100.0)
    }
}

// ---------------------------------------------------------------------------
// Memory ratio
// ---------------------------------------------------------------------------

/// Memory utilization as a percentage of total.
pub fn memory_pct(mem: MemKib) -> Result<f64, CollectError> {
    if mem.total == 0 {
        return Err(CollectError::Parse("meminfo reports zero total".into()));
    }
    Ok((mem.total - mem.free) as f64 / mem.total as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Cycle driver
// ---------------------------------------------------------------------------

/// Samples one OSS node into encoded v2 records.
///
/// Owns the collectors and the CPU differencer for the process lifetime.
/// Cycles must be issued sequentially from one place; the differencer is
/// only meaningful over ordered consecutive readings.
pub struct OstSampler<F: FileSystem + Clone> {
    system: SystemCollector<F>,
    lustre: LustreCollector<F>,
    cpu: CpuDifferencer,
    capacity: usize,
}

impl<F: FileSystem + Clone> OstSampler<F> {
    /// Creates a new sampler.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    /// * `lustre_path` - Base path to the Lustre proc tree (usually
    ///   "/proc/fs/lustre")
    pub fn new(fs: F, proc_path: impl Into<String>, lustre_path: impl Into<String>) -> Self {
        Self {
            system: SystemCollector::new(fs.clone(), proc_path),
            lustre: LustreCollector::new(fs, lustre_path),
            cpu: CpuDifferencer::new(),
            capacity: DEFAULT_RECORD_CAPACITY,
        }
    }

    /// Sets the record capacity in bytes.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Runs one sampling cycle.
    ///
    /// The first probe failure aborts the cycle; partial records are never
    /// emitted. A failed CPU probe both demotes the differencer and
    /// surfaces the probe's own error.
    pub fn sample(&mut self) -> Result<SampleOutcome, SampleError> {
        let names = self.lustre.ost_list()?;
        if names.is_empty() {
            debug!("no OSTs configured, suppressing emission");
            return Ok(SampleOutcome::Empty);
        }

        let host = self.system.collect_hostname()?;

        let cpu_pct = match self.system.collect_cpu_ticks() {
            Ok(ticks) => self.cpu.update(Some(ticks)),
            Err(e) => {
                warn!("cpu probe failed, demoting differencer: {}", e);
                self.cpu.update(None);
                return Err(e.into());
            }
        }
        .ok_or(SampleError::NotReady)?;

        let mem_pct = memory_pct(self.system.collect_mem()?)?;

        let mut entries = Vec::with_capacity(names.len());
        for name in &names {
            entries.push(self.collect_entry(name)?);
        }

        let record = codec::encode_record(&host, cpu_pct, mem_pct, &entries, self.capacity)?;
        debug!("emitting {} byte record, {} targets", record.len(), entries.len());
        Ok(SampleOutcome::Emitted(record))
    }

    fn collect_entry(&self, name: &str) -> Result<OstEntry, CollectError> {
        let uuid = self.lustre.ost_uuid(name)?;
        let (inodes_free, inodes_total) = self.lustre.ost_files(name)?;
        let (kbytes_free, kbytes_total) = self.lustre.ost_kbytes(name)?;
        let rw = self.lustre.ost_rwbytes(name)?;

        Ok(OstEntry {
            name: uuid,
            inodes_free,
            inodes_total,
            kbytes_free,
            kbytes_total,
            read_bytes: rw.read_bytes,
            write_bytes: rw.write_bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::collector::MockFs;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    // -- helpers --

    fn ticks(busy: u64, total: u64) -> Option<CpuTicks> {
        Some(CpuTicks { busy, total })
    }

    /// Mock filesystem whose contents can be swapped between cycles.
    #[derive(Clone)]
    struct SharedFs(Arc<Mutex<MockFs>>);

    impl SharedFs {
        fn new(fs: MockFs) -> Self {
            Self(Arc::new(Mutex::new(fs)))
        }

        fn update(&self, f: impl FnOnce(&mut MockFs)) {
            f(&mut self.0.lock().unwrap());
        }
    }

    impl FileSystem for SharedFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.0.lock().unwrap().read_to_string(path)
        }

        fn exists(&self, path: &Path) -> bool {
            self.0.lock().unwrap().exists(path)
        }

        fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
            self.0.lock().unwrap().read_dir(path)
        }
    }

    /// Second `/proc/stat` reading for `MockFs::typical_oss`: +2500 busy
    /// ticks over +10000 total, i.e. 25% utilization.
    const STAT_SECOND: &str = "\
cpu  12000 500 3500 87000 1500 200 100 0 0 0
ctxt 500123
btime 1700000000
";

    /// Third reading, advanced again past `STAT_SECOND`.
    const STAT_THIRD: &str = "\
cpu  14000 500 4000 90000 1700 200 100 0 0 0
ctxt 500456
btime 1700000000
";

    // ===== CpuDifferencer =====

    #[test]
    fn cpu_first_update_is_not_ready() {
        let mut d = CpuDifferencer::new();
        assert_eq!(d.update(ticks(100, 1000)), None);
    }

    #[test]
    fn cpu_second_update_emits() {
        let mut d = CpuDifferencer::new();
        d.update(ticks(100, 1000));
        let pct = d.update(ticks(200, 2000)).unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cpu_failure_sequence() {
        // (100,1000), (200,2000), fail, (500,5000), (700,8000)
        // -> not ready, 10.0, not ready, 10.0, ~6.667
        // The fourth percentage spans the failed cycle's gap: the shift on
        // failure left both slots holding (200,2000).
        let mut d = CpuDifferencer::new();
        assert_eq!(d.update(ticks(100, 1000)), None);
        assert!((d.update(ticks(200, 2000)).unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(d.update(None), None);
        assert!((d.update(ticks(500, 5000)).unwrap() - 10.0).abs() < 1e-9);
        let pct = d.update(ticks(700, 8000)).unwrap();
        assert!((pct - 200.0 / 3000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn cpu_single_failure_recovers_with_one_success() {
        let mut d = CpuDifferencer::new();
        d.update(ticks(100, 1000));
        d.update(ticks(200, 2000));
        assert_eq!(d.update(None), None);
        // One success suffices: delta spans the failed cycle
        let pct = d.update(ticks(600, 4000)).unwrap();
        assert!((pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn cpu_consecutive_failures_go_cold() {
        let mut d = CpuDifferencer::new();
        d.update(ticks(100, 1000));
        d.update(ticks(200, 2000));
        d.update(None);
        d.update(None);
        // Cold again: two successes needed
        assert_eq!(d.update(ticks(300, 3000)), None);
        assert!(d.update(ticks(400, 4000)).is_some());
    }

    #[test]
    fn cpu_failure_while_cold_stays_cold() {
        let mut d = CpuDifferencer::new();
        assert_eq!(d.update(None), None);
        assert_eq!(d.update(ticks(100, 1000)), None);
    }

    #[test]
    fn cpu_zero_total_delta_is_not_ready() {
        let mut d = CpuDifferencer::new();
        d.update(ticks(100, 1000));
        assert_eq!(d.update(ticks(100, 1000)), None);
    }

    #[test]
    fn cpu_pct_bounded_when_busy_delta_within_total() {
        let mut d = CpuDifferencer::new();
        d.update(ticks(100, 1000));
        let pct = d.update(ticks(1100, 2000)).unwrap();
        assert!((0.0..=100.0).contains(&pct));
        assert!((pct - 100.0).abs() < 1e-9);
    }

    // ===== memory_pct =====

    #[test]
    fn memory_pct_basic() {
        let pct = memory_pct(MemKib {
            total: 16384000,
            free: 8192000,
        })
        .unwrap();
        assert!((pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn memory_pct_zero_total_is_parse_error() {
        match memory_pct(MemKib { total: 0, free: 0 }) {
            Err(CollectError::Parse(_)) => {}
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    // ===== OstSampler =====

    #[test]
    fn sample_empty_when_no_targets() {
        let mut sampler = OstSampler::new(MockFs::no_targets(), "/proc", "/proc/fs/lustre");
        assert_eq!(sampler.sample().unwrap(), SampleOutcome::Empty);
        // Still empty on the next cycle, never NotReady
        assert_eq!(sampler.sample().unwrap(), SampleOutcome::Empty);
    }

    #[test]
    fn sample_warm_up_then_emit() {
        let fs = SharedFs::new(MockFs::typical_oss());
        let mut sampler = OstSampler::new(fs.clone(), "/proc", "/proc/fs/lustre");

        match sampler.sample() {
            Err(SampleError::NotReady) => {}
            other => panic!("expected NotReady, got {:?}", other),
        }

        fs.update(|fs| fs.add_file("/proc/stat", STAT_SECOND));
        let record = match sampler.sample().unwrap() {
            SampleOutcome::Emitted(r) => r,
            SampleOutcome::Empty => panic!("expected a record"),
        };

        assert_eq!(
            record,
            "2;oss01;25.000000;50.000000;\
             fs-OST0000_UUID;1000000;2000000;52428800;104857600;4987613184;1399618797;\
             fs-OST0001_UUID;1500000;2000000;78643200;104857600;913438722;2236962048;"
        );
    }

    #[test]
    fn sample_round_trips_through_decoder() {
        let fs = SharedFs::new(MockFs::typical_oss());
        let mut sampler = OstSampler::new(fs.clone(), "/proc", "/proc/fs/lustre");

        let _ = sampler.sample();
        fs.update(|fs| fs.add_file("/proc/stat", STAT_SECOND));
        let SampleOutcome::Emitted(record) = sampler.sample().unwrap() else {
            panic!("expected a record");
        };

        let decoded = decode(&record).unwrap();
        assert_eq!(decoded.host, "oss01");
        assert!((decoded.cpu_pct - 25.0).abs() < 1e-4);
        assert!((decoded.mem_pct - 50.0).abs() < 1e-4);
        assert_eq!(decoded.entries.len(), 2);
        assert_eq!(decoded.entries[0].name, "fs-OST0000_UUID");
        assert_eq!(decoded.entries[1].read_bytes, 913438722);
    }

    #[test]
    fn sample_unchanged_ticks_stay_not_ready() {
        let mut sampler = OstSampler::new(MockFs::typical_oss(), "/proc", "/proc/fs/lustre");
        for _ in 0..3 {
            assert!(matches!(sampler.sample(), Err(SampleError::NotReady)));
        }
    }

    #[test]
    fn sample_cpu_probe_failure_then_recovery() {
        let fs = SharedFs::new(MockFs::typical_oss());
        let mut sampler = OstSampler::new(fs.clone(), "/proc", "/proc/fs/lustre");

        // Warm up to the ready state
        let _ = sampler.sample();
        fs.update(|fs| fs.add_file("/proc/stat", STAT_SECOND));
        assert!(matches!(sampler.sample(), Ok(SampleOutcome::Emitted(_))));

        fs.update(|fs| fs.remove("/proc/stat"));
        match sampler.sample() {
            Err(SampleError::Collect(CollectError::Io(_))) => {}
            other => panic!("expected Io error, got {:?}", other),
        }

        // One good reading is enough to be ready again
        fs.update(|fs| fs.add_file("/proc/stat", STAT_THIRD));
        assert!(matches!(sampler.sample(), Ok(SampleOutcome::Emitted(_))));
    }

    #[test]
    fn sample_aborts_when_target_vanishes_mid_cycle() {
        let fs = SharedFs::new(MockFs::typical_oss());
        let mut sampler = OstSampler::new(fs.clone(), "/proc", "/proc/fs/lustre");

        let _ = sampler.sample();
        fs.update(|fs| {
            fs.add_file("/proc/stat", STAT_SECOND);
            fs.remove("/proc/fs/lustre/obdfilter/fs-OST0001/stats");
        });

        match sampler.sample() {
            Err(SampleError::Collect(CollectError::TargetGone(name))) => {
                assert_eq!(name, "fs-OST0001");
            }
            other => panic!("expected TargetGone, got {:?}", other),
        }
    }

    #[test]
    fn sample_too_small_capacity_is_encode_error() {
        let fs = SharedFs::new(MockFs::typical_oss());
        let mut sampler =
            OstSampler::new(fs.clone(), "/proc", "/proc/fs/lustre").with_capacity(64);

        let _ = sampler.sample();
        fs.update(|fs| fs.add_file("/proc/stat", STAT_SECOND));

        match sampler.sample() {
            Err(SampleError::Encode(EncodeError::TooBig { cap: 64, .. })) => {}
            other => panic!("expected TooBig, got {:?}", other),
        }
    }
}
