//! Decoder for the v2 OST record.
//!
//! Both the header and the per-target entries are consumed through a single
//! tokenizer primitive, [`take_fields`]: take N `;`-terminated fields and
//! position the cursor immediately past the Nth terminator.

use crate::model::{OstEntry, OstRecord};

/// Error type for malformed records.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed record: {}", self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Header fields of a v2 record, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordHeader<'a> {
    pub host: &'a str,
    pub cpu_pct: f32,
    pub mem_pct: f32,
}

/// Takes `n` `;`-terminated fields off the front of `s`.
///
/// Returns the fields (joined, without the final separator) and the rest of
/// the string starting just past the nth `;`, or `None` if fewer than `n`
/// separators remain.
fn take_fields(s: &str, n: usize) -> Option<(&str, &str)> {
    debug_assert!(n > 0);
    let mut seen = 0;
    for (i, b) in s.bytes().enumerate() {
        if b == b';' {
            seen += 1;
            if seen == n {
                return Some((&s[..i], &s[i + 1..]));
            }
        }
    }
    None
}

fn parse_u64(token: &str, what: &str) -> Result<u64, DecodeError> {
    token
        .parse()
        .map_err(|_| DecodeError::new(format!("invalid {} {:?}", what, token)))
}

fn parse_pct(token: &str, what: &str) -> Result<f32, DecodeError> {
    token
        .parse()
        .map_err(|_| DecodeError::new(format!("invalid {} {:?}", what, token)))
}

/// Decodes the record header and returns it with the per-target tail.
///
/// The version token must be `2`; anything else is rejected.
pub fn decode_header(record: &str) -> Result<(RecordHeader<'_>, &str), DecodeError> {
    let (head, tail) =
        take_fields(record, 4).ok_or_else(|| DecodeError::new("truncated header"))?;

    let mut fields = head.split(';');
    let version = fields.next().unwrap_or("");
    let host = fields.next().unwrap_or("");
    let cpu = fields.next().unwrap_or("");
    let mem = fields.next().unwrap_or("");

    if version != "2" {
        return Err(DecodeError::new(format!(
            "unsupported record version {:?}",
            version
        )));
    }
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(DecodeError::new(format!("invalid host {:?}", host)));
    }

    Ok((
        RecordHeader {
            host,
            cpu_pct: parse_pct(cpu, "cpu percentage")?,
            mem_pct: parse_pct(mem, "memory percentage")?,
        },
        tail,
    ))
}

/// Decodes one per-target entry off the front of `tail`.
///
/// Returns `None` at end of record. Each entry is seven `;`-terminated
/// fields: uuid, inodes free/total, kbytes free/total, read/write bytes.
pub fn decode_entry(tail: &str) -> Result<Option<(OstEntry, &str)>, DecodeError> {
    if tail.is_empty() {
        return Ok(None);
    }

    let (head, rest) =
        take_fields(tail, 7).ok_or_else(|| DecodeError::new("truncated target entry"))?;

    let mut fields = head.split(';');
    let mut next = || fields.next().unwrap_or("");

    let name = next();
    if name.is_empty() {
        return Err(DecodeError::new("empty target uuid"));
    }

    let entry = OstEntry {
        name: name.to_string(),
        inodes_free: parse_u64(next(), "inodes_free")?,
        inodes_total: parse_u64(next(), "inodes_total")?,
        kbytes_free: parse_u64(next(), "kbytes_free")?,
        kbytes_total: parse_u64(next(), "kbytes_total")?,
        read_bytes: parse_u64(next(), "read_bytes")?,
        write_bytes: parse_u64(next(), "write_bytes")?,
    };

    Ok(Some((entry, rest)))
}

/// Decodes a complete v2 record.
///
/// Iterates [`decode_entry`] until the tail is exhausted; leftover input
/// that does not form a full entry fails the whole record.
pub fn decode(record: &str) -> Result<OstRecord, DecodeError> {
    let (header, mut tail) = decode_header(record)?;

    let mut entries = Vec::new();
    while let Some((entry, rest)) = decode_entry(tail)? {
        entries.push(entry);
        tail = rest;
    }

    Ok(OstRecord {
        host: header.host.to_string(),
        cpu_pct: header.cpu_pct,
        mem_pct: header.mem_pct,
        entries,
    })
}
