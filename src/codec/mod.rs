//! Encoder/decoder for the v2 OST record wire format.
//!
//! One record is a single line of 8-bit text:
//!
//! ```text
//! 2;<host>;<cpu_pct>;<mem_pct>;<E1><E2>...<En>
//! ```
//!
//! where each `<Ei>` is
//!
//! ```text
//! <uuid>;<inodes_free>;<inodes_total>;<kbytes_free>;<kbytes_total>;<read_bytes>;<write_bytes>;
//! ```
//!
//! Every field is terminated by `;`, so the separator after a target group
//! is also the separator before the next one. The encoder and decoder agree
//! on this tokenization and on version `2` being the only accepted version.

pub mod decode;
pub mod encode;

pub use decode::{DecodeError, RecordHeader, decode, decode_entry, decode_header};
pub use encode::{DEFAULT_RECORD_CAPACITY, EncodeError, encode_record};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OstEntry;

    #[test]
    fn test_round_trip() {
        let entries = vec![
            OstEntry {
                name: "fs-OST0000_UUID".to_string(),
                inodes_free: 100,
                inodes_total: 200,
                kbytes_free: 1024,
                kbytes_total: 4096,
                read_bytes: 9,
                write_bytes: 7,
            },
            OstEntry {
                name: "fs-OST0001_UUID".to_string(),
                inodes_free: u64::MAX,
                inodes_total: u64::MAX,
                kbytes_free: 0,
                kbytes_total: 0,
                read_bytes: 1,
                write_bytes: u64::MAX - 1,
            },
        ];

        let encoded =
            encode_record("node01", 12.5, 37.0, &entries, DEFAULT_RECORD_CAPACITY).unwrap();
        let decoded = decode(&encoded).unwrap();

        assert_eq!(decoded.host, "node01");
        assert!((decoded.cpu_pct - 12.5).abs() < 1e-4);
        assert!((decoded.mem_pct - 37.0).abs() < 1e-4);
        assert_eq!(decoded.entries, entries);
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        let encoded = encode_record("node01", 1.0, 2.0, &[], DEFAULT_RECORD_CAPACITY).unwrap();
        let other = encoded.replacen('2', "3", 1);
        assert!(decode(&other).is_err());
    }
}
