//! Byte-level string tokenization shared by the scanners: locating quoted
//! tokens, resolving recorded key offsets, validating boundary residues, and
//! skipping closing levels. Multi-byte UTF-8 content is opaque here; no byte
//! of a multi-byte sequence collides with an ASCII delimiter.

use crate::cursor::ByteCursor;
use anyhow::{Context, Result};

/// A quoted string token with its byte span: `start` is the opening quote
/// offset, `end` is the offset just after the closing quote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: u64,
    pub end: u64,
}

/// Decode raw string-content bytes (escapes intact, quotes stripped).
/// Falls back to a lossy copy when the content is not a clean JSON string.
fn decode_content(raw: &[u8]) -> String {
    let mut quoted = Vec::with_capacity(raw.len() + 2);
    quoted.push(b'"');
    quoted.extend_from_slice(raw);
    quoted.push(b'"');
    match serde_json::from_slice::<String>(&quoted) {
        Ok(s) => s,
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Consume string content up to and including the closing quote; the cursor
/// must sit just after the opening quote. Returns (raw content bytes, closed).
fn read_content_tail(cur: &mut ByteCursor) -> Result<(Vec<u8>, bool)> {
    let mut raw = Vec::new();
    loop {
        match cur.next_byte()? {
            None => return Ok((raw, false)),
            Some(b'"') => return Ok((raw, true)),
            Some(b'\\') => {
                raw.push(b'\\');
                if let Some(esc) = cur.next_byte()? {
                    raw.push(esc);
                }
            }
            Some(b) => raw.push(b),
        }
    }
}

/// Scan forward for the next quoted string before `limit` and consume it.
/// Returns `None` when no complete token starts before `limit`.
pub fn next_token(cur: &mut ByteCursor, limit: u64) -> Result<Option<Token>> {
    while cur.pos() < limit {
        match cur.next_byte()? {
            None => return Ok(None),
            Some(b'"') => {
                let start = cur.pos() - 1;
                let (raw, closed) = read_content_tail(cur)?;
                if !closed {
                    return Ok(None);
                }
                return Ok(Some(Token {
                    text: decode_content(&raw),
                    start,
                    end: cur.pos(),
                }));
            }
            Some(_) => {}
        }
    }
    Ok(None)
}

/// Read and decode string content; the cursor must sit just after the
/// opening quote.
pub fn string_content_here(cur: &mut ByteCursor) -> Result<String> {
    let (raw, _closed) = read_content_tail(cur)?;
    Ok(decode_content(&raw))
}

/// Consume string content through the closing quote without building it.
/// Returns false when the stream ends first.
pub fn consume_string(cur: &mut ByteCursor) -> Result<bool> {
    loop {
        match cur.next_byte()? {
            None => return Ok(false),
            Some(b'"') => return Ok(true),
            Some(b'\\') => {
                cur.next_byte()?;
            }
            Some(_) => {}
        }
    }
}

/// Resolve a key recorded at `pos` (just after its opening quote) back to its
/// string content.
pub fn read_string_at(cur: &mut ByteCursor, pos: u64) -> Result<String> {
    cur.seek_to(pos).with_context(|| format!("seek to key at {}", pos))?;
    string_content_here(cur)
}

/// Whether `raw` is valid JSON string content. A partition cut can land in
/// the middle of a multi-byte codepoint, so up to three leading UTF-8
/// continuation bytes are ignored before validating.
pub fn is_valid_string(raw: &[u8]) -> bool {
    let mut s = raw;
    let mut skipped = 0;
    while skipped < 3 && !s.is_empty() && s[0] & 0xC0 == 0x80 {
        s = &s[1..];
        skipped += 1;
    }
    let mut quoted = Vec::with_capacity(s.len() + 2);
    quoted.push(b'"');
    quoted.extend_from_slice(s);
    quoted.push(b'"');
    serde_json::from_slice::<String>(&quoted).is_ok()
}

/// Boundary prelude shared by the scanners: a byte range whose start landed
/// inside a string resumes just past that string's closing quote, restoring
/// quote parity for everything downstream. The residue must be valid string
/// content and the quote must be followed by a delimiter, whitespace, or the
/// end of the range to commit; anything else resets the cursor to `start`.
pub fn resume_string_boundary(cur: &mut ByteCursor, start: u64, limit: u64) -> Result<()> {
    let mut raw = Vec::new();
    let mut closed = false;
    while cur.pos() < limit {
        match cur.next_byte()? {
            None => break,
            Some(b'"') => {
                closed = true;
                break;
            }
            Some(b'\\') => {
                raw.push(b'\\');
                if let Some(esc) = cur.next_byte()? {
                    raw.push(esc);
                }
            }
            Some(b) => raw.push(b),
        }
    }
    let follow_ok = match cur.peek()? {
        None => true,
        Some(b) => matches!(b, b',' | b'}' | b']' | b':') || b.is_ascii_whitespace(),
    };
    if closed && follow_ok && is_valid_string(&raw) {
        Ok(())
    } else {
        cur.seek_to(start)?;
        Ok(())
    }
}

/// Advance past `n` unmatched closing brackets, treating strings as opaque.
/// Returns the position just after the last one consumed (or wherever the
/// scan stopped at `limit`/EOF).
pub fn skip_close_levels(cur: &mut ByteCursor, n: u32, limit: u64) -> Result<u64> {
    let mut remaining = n;
    let mut depth: u32 = 0;
    while remaining > 0 && cur.pos() < limit {
        let b = match cur.next_byte()? {
            Some(b) => b,
            None => break,
        };
        match b {
            b'"' => {
                read_content_tail(cur)?;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                if depth > 0 {
                    depth -= 1;
                } else {
                    remaining -= 1;
                }
            }
            _ => {}
        }
    }
    Ok(cur.pos())
}
