//! Document statistics: key sightings aggregated by nesting level and DFA
//! state, collected from a sample scan. The speculation table is built from
//! these.

use crate::cursor::ByteCursor;
use crate::dfa::Dfa;
use crate::tokenizer;
use ahash::RandomState;
use anyhow::Result;
use std::collections::HashMap;

/// Deterministic hasher state so table iteration is stable across runs.
fn fixed_state() -> RandomState {
    RandomState::with_seeds(
        0x6a73_6f6e_7368_6172,
        0x646b_6579_7374_6174,
        0x1357_9bdf_acce_55ed,
        0x2468_ace0_fdb9_8642,
    )
}

/// One aggregated sighting of a key: where it was seen and the DFA state it
/// maps to after matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenSighting {
    pub level: u32,
    pub dfa_state: u32,
    pub count: u64,
}

#[derive(Clone, Debug)]
pub struct DocumentStats {
    sightings: HashMap<String, Vec<TokenSighting>, RandomState>,
}

impl Default for DocumentStats {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStats {
    pub fn new() -> Self {
        Self {
            sightings: HashMap::with_hasher(fixed_state()),
        }
    }

    pub fn record(&mut self, key: &str, level: u32, dfa_state: u32) {
        self.record_n(key, level, dfa_state, 1);
    }

    pub fn record_n(&mut self, key: &str, level: u32, dfa_state: u32, n: u64) {
        let list = self.sightings.entry(key.to_string()).or_default();
        if let Some(s) = list
            .iter_mut()
            .find(|s| s.level == level && s.dfa_state == dfa_state)
        {
            s.count += n;
        } else {
            list.push(TokenSighting {
                level,
                dfa_state,
                count: n,
            });
        }
    }

    pub fn merge(&mut self, other: &DocumentStats) {
        for (key, list) in &other.sightings {
            for s in list {
                self.record_n(key, s.level, s.dfa_state, s.count);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &[TokenSighting])> {
        self.sightings.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.sightings.len()
    }
    pub fn is_empty(&self) -> bool {
        self.sightings.is_empty()
    }
}

struct Frame {
    is_object: bool,
    level: u32,
    /// State keys of this object (or elements of this array) step from.
    key_base: usize,
}

/// Scan `[0, limit)` of a document, recording every key with its nesting
/// level and post-match DFA state. Levels follow the projector's rules:
/// objects always deepen, arrays only when the DFA consumes them or the
/// current state is a descendant.
pub fn collect_stats(cur: &mut ByteCursor, limit: u64, dfa: &Dfa) -> Result<DocumentStats> {
    let mut stats = DocumentStats::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut val_state: usize = 0;
    let mut in_value = false;

    let cur_level = |frames: &[Frame]| frames.last().map(|f| f.level).unwrap_or(0);

    while cur.pos() < limit {
        let b = match cur.next_byte()? {
            Some(b) => b,
            None => break,
        };
        match b {
            b'{' => {
                let level = cur_level(&frames) + 1;
                frames.push(Frame {
                    is_object: true,
                    level,
                    key_base: val_state,
                });
                in_value = false;
            }
            b'[' => {
                let want = cur_level(&frames) + 1;
                let (level, state) = match dfa.step_array(val_state, want) {
                    Some(next) => (want, next),
                    None if dfa.descendant_at(val_state) => (want, val_state),
                    None => (cur_level(&frames), val_state),
                };
                frames.push(Frame {
                    is_object: false,
                    level,
                    key_base: state,
                });
                val_state = state;
            }
            b'}' | b']' => {
                frames.pop();
                val_state = frames.last().map(|f| f.key_base).unwrap_or(0);
                in_value = false;
            }
            b'"' => {
                let is_key = frames
                    .last()
                    .map(|f| f.is_object && !in_value)
                    .unwrap_or(false);
                if is_key {
                    let frame = frames.last().unwrap();
                    let text = tokenizer::string_content_here(cur)?;
                    let (next, _verdict) = dfa.step_key(frame.key_base, &text, frame.level);
                    stats.record(&text, frame.level, next as u32);
                    val_state = next;
                } else {
                    tokenizer::consume_string(cur)?;
                }
            }
            b':' => in_value = true,
            b',' => {
                if frames.last().map(|f| f.is_object).unwrap_or(true) {
                    in_value = false;
                }
            }
            _ => {}
        }
    }
    Ok(stats)
}
