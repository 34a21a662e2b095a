//! Syntactic scanner: scan a byte range and return its residual stack of
//! unmatched opens, dangling closes, and the keys between them.

use crate::cursor::ByteCursor;
use crate::descriptor::{StackEntry, StackSym};
use crate::skip::skip;
use crate::tokenizer;
use anyhow::Result;

const QUOTE: u8 = b'"';

/// Residual syntactic state of one scanned partition.
#[derive(Clone, Debug)]
pub struct EndState {
    pub stack: Vec<StackEntry>,
    /// Scanner's final position, past the partition end when it had to
    /// finish a structure.
    pub end: u64,
    pub past_end: bool,
}

#[inline]
fn top_sym(syms: &[u8], top: isize) -> Option<u8> {
    if top >= 0 {
        Some(syms[top as usize])
    } else {
        None
    }
}

/// Push into the slot arrays. Pops only move `top`, so slots between `top`
/// and the high-water mark stay allocated and are overwritten here instead
/// of reallocating.
#[inline]
fn push_slot(
    syms: &mut Vec<u8>,
    positions: &mut Vec<u64>,
    top: &mut isize,
    high: &mut isize,
    sym: u8,
    pos: u64,
) {
    *top += 1;
    if *top <= *high {
        syms[*top as usize] = sym;
        positions[*top as usize] = pos;
    } else {
        syms.push(sym);
        positions.push(pos);
        *high = *top;
    }
}

/// Scan `[start, end)` and return the live stack, with each key slot
/// resolved back to its string content. Positions are the byte offset just
/// after each token's byte; for keys that is just after the opening quote.
pub fn end_state(cur: &mut ByteCursor, start: u64, end: u64) -> Result<EndState> {
    let mut syms: Vec<u8> = Vec::new();
    let mut positions: Vec<u64> = Vec::new();
    let mut top: isize = -1;
    let mut high: isize = -1;
    let mut in_value = false;

    if start > 0 {
        tokenizer::resume_string_boundary(cur, start, end)?;
    }

    while cur.pos() < end {
        let b = match cur.next_byte()? {
            Some(b) => b,
            None => break,
        };
        match b {
            b'{' => {
                push_slot(&mut syms, &mut positions, &mut top, &mut high, b'{', cur.pos());
                in_value = false;
            }
            b'[' => {
                push_slot(&mut syms, &mut positions, &mut top, &mut high, b'[', cur.pos());
            }
            b'}' => {
                if top_sym(&syms, top) == Some(QUOTE) {
                    top -= 1; // the closing object takes its last key with it
                }
                if top_sym(&syms, top) == Some(b'{') {
                    top -= 1;
                } else {
                    push_slot(&mut syms, &mut positions, &mut top, &mut high, b'}', cur.pos());
                }
            }
            b']' => {
                if top_sym(&syms, top) == Some(b'[') {
                    top -= 1;
                } else {
                    push_slot(&mut syms, &mut positions, &mut top, &mut high, b']', cur.pos());
                }
            }
            QUOTE => {
                let qpos = cur.pos();
                if in_value {
                    skip(cur, u64::MAX, QUOTE)?;
                } else if top_sym(&syms, top) == Some(b'{') {
                    // first key of an object
                    push_slot(&mut syms, &mut positions, &mut top, &mut high, QUOTE, qpos);
                    tokenizer::consume_string(cur)?;
                } else if top_sym(&syms, top) == Some(QUOTE) {
                    // sibling key replaces its predecessor in place
                    positions[top as usize] = qpos;
                    tokenizer::consume_string(cur)?;
                } else if top_sym(&syms, top) == Some(b'[') {
                    // array element
                    skip(cur, u64::MAX, QUOTE)?;
                } else {
                    // no structural context for this quote (boundary garbage)
                }
            }
            b':' => in_value = true,
            b',' => {
                if top_sym(&syms, top) != Some(b'[') {
                    in_value = false;
                }
            }
            _ => {}
        }
    }
    let scan_end = cur.pos();

    // Materialize the live prefix, resolving key offsets to their content.
    let live = (top + 1) as usize;
    let mut stack = Vec::with_capacity(live);
    for i in 0..live {
        let pos = positions[i];
        let sym = match syms[i] {
            b'{' => StackSym::OpenBrace,
            b'[' => StackSym::OpenBracket,
            b'}' => StackSym::CloseBrace,
            b']' => StackSym::CloseBracket,
            _ => StackSym::Key(tokenizer::read_string_at(cur, pos)?),
        };
        stack.push(StackEntry::new(sym, pos));
    }

    Ok(EndState {
        stack,
        end: scan_end,
        past_end: scan_end > end,
    })
}
