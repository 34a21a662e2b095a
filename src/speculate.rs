//! Speculation: the rare-key anchor table and the partition start shifter.

use crate::cursor::ByteCursor;
use crate::descriptor::PartitionDescriptor;
use crate::stats::DocumentStats;
use crate::tokenizer;
use ahash::RandomState;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt;

/// Minimum occurrences for a single-level key to qualify as an anchor.
pub const MIN_ANCHOR_OCCURRENCES: u64 = 1000;
/// Fallback table size when too few keys qualify outright.
pub const FALLBACK_TOP_KEYS: usize = 10;

/// No key in the document statistics can serve as a speculation anchor.
/// Callers typically downcast to this and fall back to the full pass.
#[derive(Clone, Copy, Debug)]
pub struct SpeculationImpossible;

impl fmt::Display for SpeculationImpossible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no key qualifies as a speculation anchor")
    }
}
impl std::error::Error for SpeculationImpossible {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorEntry {
    pub level: u32,
    pub dfa_state: u32,
    pub occurrences: u64,
}

/// Anchor keys: keys known to occur at exactly one nesting level.
#[derive(Clone, Debug)]
pub struct SpeculationTable {
    map: HashMap<String, AnchorEntry, RandomState>,
}

impl SpeculationTable {
    pub fn from_stats(stats: &DocumentStats) -> Result<Self> {
        let mut candidates: Vec<(String, AnchorEntry)> = Vec::new();
        for (key, sightings) in stats.iter() {
            let first = match sightings.first() {
                Some(s) => s,
                None => continue,
            };
            if !sightings.iter().all(|s| s.level == first.level) {
                continue;
            }
            let occurrences: u64 = sightings.iter().map(|s| s.count).sum();
            let best = sightings.iter().max_by_key(|s| s.count).unwrap();
            candidates.push((
                key.clone(),
                AnchorEntry {
                    level: first.level,
                    dfa_state: best.dfa_state,
                    occurrences,
                },
            ));
        }
        let qualified: Vec<(String, AnchorEntry)> = candidates
            .iter()
            .filter(|(_, e)| e.occurrences >= MIN_ANCHOR_OCCURRENCES)
            .cloned()
            .collect();
        let chosen = if qualified.len() < FALLBACK_TOP_KEYS && candidates.len() >= FALLBACK_TOP_KEYS
        {
            // too few heavy hitters: take the most frequent single-level keys
            candidates.sort_by(|a, b| {
                b.1.occurrences
                    .cmp(&a.1.occurrences)
                    .then_with(|| a.0.cmp(&b.0))
            });
            candidates.truncate(FALLBACK_TOP_KEYS);
            candidates
        } else {
            qualified
        };
        if chosen.is_empty() {
            return Err(anyhow::Error::new(SpeculationImpossible));
        }
        let mut map = HashMap::with_capacity_and_hasher(
            chosen.len(),
            RandomState::with_seeds(
                0x616e_6368_6f72_7461,
                0x626c_6573_7065_6375,
                0xfeed_face_dead_beef,
                0x0bad_f00d_c0de_cafe,
            ),
        );
        for (k, e) in chosen {
            map.insert(k, e);
        }
        Ok(Self { map })
    }

    pub fn get(&self, key: &str) -> Option<&AnchorEntry> {
        self.map.get(key)
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Slide a partition's start forward to the next anchor key found in the
/// stream, and derive its level and DFA state from the table. Buckets that
/// start at 0 pass through; a bucket with no anchor before the file end is
/// pushed to the file end (it contributes nothing).
pub fn shift_to_anchor(
    cur: &mut ByteCursor,
    desc: &PartitionDescriptor,
    table: &SpeculationTable,
    file_size: u64,
) -> Result<PartitionDescriptor> {
    let mut out = desc.clone();
    if desc.start == 0 {
        return Ok(out);
    }
    // Restore quote parity first: a start inside a string would leave every
    // token flipped into the inter-key gaps.
    tokenizer::resume_string_boundary(cur, desc.start, file_size)?;
    loop {
        let tok = match tokenizer::next_token(cur, file_size)? {
            Some(t) => t,
            None => {
                out.start = file_size;
                out.start_level = 0;
                out.dfa_state = 0;
                return Ok(out);
            }
        };
        let entry = match table.get(&tok.text) {
            Some(e) => *e,
            None => continue,
        };
        let mut skipped_levels = false;
        if entry.level > entry.dfa_state {
            // the anchor lies deeper than its DFA consumes: surface to the
            // consumed level before handing off
            out.start = tokenizer::skip_close_levels(cur, entry.level - entry.dfa_state, file_size)?;
            out.start_level = entry.dfa_state;
            out.dfa_state = entry.dfa_state;
            skipped_levels = true;
        } else {
            // pull the key itself back into the partition
            out.start = tok.start;
            out.start_level = entry.level;
            out.dfa_state = entry.dfa_state;
        }
        if out.dfa_state == out.start_level && !skipped_levels && out.dfa_state > 0 {
            // the anchor key is the last matched component; its value is not
            // yet consumed
            out.dfa_state -= 1;
        }
        return Ok(out);
    }
}
