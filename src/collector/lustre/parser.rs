//! Parsers for Lustre `obdfilter` proc files.
//!
//! Pure functions over file contents, testable with string inputs. The
//! interesting one is the `stats` table, which holds one line per counter:
//!
//! ```text
//! snapshot_time             1723022176.123456 secs.usecs
//! read_bytes                4856 samples [bytes] 4096 1048576 4987613184
//! write_bytes               1422 samples [bytes] 4096 1048576 1399618797
//! ```
//!
//! The last column is the cumulative sum. A counter with no events since
//! mount has no line at all.

use crate::collector::procfs::parser::ParseError;

/// Cumulative read/write byte counters from a target's `stats` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RwBytes {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Parses the `read_bytes`/`write_bytes` sums out of a `stats` table.
///
/// Missing counter lines report 0.
pub fn parse_stats_rwbytes(content: &str) -> Result<RwBytes, ParseError> {
    let mut rw = RwBytes::default();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&name) = parts.first() else {
            continue;
        };
        if name != "read_bytes" && name != "write_bytes" {
            continue;
        }

        // name count "samples" [unit] min max sum
        let sum = parts
            .get(6)
            .ok_or_else(|| ParseError::new(format!("short {} line", name)))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {} sum", name)))?;

        if name == "read_bytes" {
            rw.read_bytes = sum;
        } else {
            rw.write_bytes = sum;
        }
    }

    Ok(rw)
}

/// Parses a single-value counter file (`filesfree`, `kbytestotal`, ...).
pub fn parse_counter(content: &str) -> Result<u64, ParseError> {
    content
        .trim()
        .parse()
        .map_err(|_| ParseError::new(format!("invalid counter value {:?}", content.trim())))
}
