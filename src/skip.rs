//! Skip scanner: advance past one JSON value to the byte just before the
//! next sibling delimiter, honoring string escapes.

use crate::cursor::ByteCursor;
use anyhow::Result;

/// Advance past the value whose first byte `current` was just consumed, then
/// slide to the next `,` `]` `}` at the same nesting (the cursor is rewound
/// so that delimiter is the next byte read). Returns the new position.
///
/// Byte-oriented over ASCII delimiters; bytes of multi-byte UTF-8 sequences
/// never collide with them and pass through as opaque string content.
pub fn skip(cur: &mut ByteCursor, end: u64, current: u8) -> Result<u64> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    match current {
        b'{' | b'[' => stack.push(current),
        b'"' => {
            stack.push(b'"');
            in_string = true;
        }
        b',' | b']' | b'}' => {
            cur.rewind_one()?;
            return Ok(cur.pos());
        }
        _ => {}
    }
    loop {
        if stack.is_empty() && cur.pos() >= end {
            return Ok(cur.pos());
        }
        let b = match cur.next_byte()? {
            Some(b) => b,
            None => return Ok(cur.pos()),
        };
        if in_string {
            match b {
                b'\\' => {
                    // escaped byte, opaque
                    cur.next_byte()?;
                }
                b'"' => {
                    stack.pop();
                    in_string = false;
                }
                _ => {}
            }
            continue;
        }
        match b {
            b'{' | b'[' => stack.push(b),
            b'"' => {
                stack.push(b'"');
                in_string = true;
            }
            b'}' | b']' => {
                if stack.is_empty() {
                    cur.rewind_one()?;
                    return Ok(cur.pos());
                }
                stack.pop();
            }
            b',' => {
                if stack.is_empty() {
                    cur.rewind_one()?;
                    return Ok(cur.pos());
                }
            }
            _ => {}
        }
    }
}
