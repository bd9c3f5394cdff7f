//! Encoder for the v2 OST record.
//!
//! The record is a single line of `;`-separated tokens: a four-field header
//! (version, host, cpu%, mem%) followed by one seven-field group per target,
//! every field terminated by `;`. There is no escaping, so tokens must not
//! contain `;` or whitespace; the encoder rejects offenders instead of
//! emitting a record the decoder cannot tokenize.

use crate::model::OstEntry;

/// Default capacity for emitted records, bytes.
pub const DEFAULT_RECORD_CAPACITY: usize = 8192;

/// Error type for encoding failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A token contained a separator or whitespace.
    BadToken(String),
    /// The encoded record did not fit the caller's capacity.
    TooBig { need: usize, cap: usize },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::BadToken(tok) => {
                write!(f, "token {:?} contains a separator or whitespace", tok)
            }
            EncodeError::TooBig { need, cap } => {
                write!(f, "record needs {} bytes, capacity is {}", need, cap)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

fn check_token(token: &str) -> Result<(), EncodeError> {
    if token.is_empty() || token.contains(';') || token.chars().any(char::is_whitespace) {
        return Err(EncodeError::BadToken(token.to_string()));
    }
    Ok(())
}

/// Encodes a v2 OST record.
///
/// Percentages are emitted with six fractional digits. Success requires the
/// final length to be strictly below `capacity`; an oversized record is
/// reported as [`EncodeError::TooBig`] and nothing is returned.
pub fn encode_record(
    host: &str,
    cpu_pct: f64,
    mem_pct: f64,
    entries: &[OstEntry],
    capacity: usize,
) -> Result<String, EncodeError> {
    check_token(host)?;

    let mut buf = format!("2;{};{:.6};{:.6};", host, cpu_pct, mem_pct);
    for entry in entries {
        check_token(&entry.name)?;
        buf.push_str(&format!(
            "{};{};{};{};{};{};{};",
            entry.name,
            entry.inodes_free,
            entry.inodes_total,
            entry.kbytes_free,
            entry.kbytes_total,
            entry.read_bytes,
            entry.write_bytes,
        ));
    }

    if buf.len() >= capacity {
        return Err(EncodeError::TooBig {
            need: buf.len() + 1,
            cap: capacity,
        });
    }

    Ok(buf)
}
