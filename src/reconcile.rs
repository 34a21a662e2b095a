//! Reconciler: turn scanned buckets into final partition descriptors, in two
//! passes per file — forward to evolve the ancestor stack and project every
//! partition, then reverse to shift starts past pending closes and contract
//! ends.

use crate::descriptor::{PartitionDescriptor, StackEntry};
use crate::dfa::Dfa;
use crate::merge::merge_syntax_stack;
use crate::project::{partition_level_skipping, LevelSkip};
use std::path::PathBuf;

/// Worker output of the full-pass scan phase for one raw bucket.
#[derive(Clone, Debug)]
pub struct ScannedPartition {
    pub desc: PartitionDescriptor,
    pub stack: Vec<StackEntry>,
    /// Scanner's final position; beyond `desc.end` when it had to finish a
    /// structure.
    pub scan_end: u64,
    pub past_end: bool,
}

struct Cached {
    ls: LevelSkip,
    in_state: Vec<StackEntry>,
    /// Start rebased onto the predecessor's overrun point (always a clean
    /// syntactic boundary) when the scanners overlapped.
    base_start: u64,
    eff_end: u64,
    /// The predecessor chain scanned past this partition's entire range.
    absorbed: bool,
}

pub fn reconcile_full(parts: &[ScannedPartition], dfa: &mut Dfa) -> Vec<PartitionDescriptor> {
    let mut cached: Vec<Cached> = Vec::with_capacity(parts.len());
    let mut evolving: Vec<StackEntry> = Vec::new();
    let mut prev_end: u64 = 0;
    let mut prev_path: Option<&PathBuf> = None;
    let mut last_live: Option<usize> = None;

    for part in parts {
        if prev_path != Some(&part.desc.path) {
            evolving.clear();
            prev_end = 0;
            prev_path = Some(&part.desc.path);
            last_live = None;
        }
        let absorbed = part.desc.start > 0 && prev_end >= part.desc.end;
        let ls = if absorbed {
            LevelSkip::default()
        } else {
            partition_level_skipping(&evolving, dfa)
        };
        let base_start = part.desc.start.max(prev_end.min(part.desc.end));
        let (merged, filtered) = merge_syntax_stack(&evolving, &part.stack, prev_end);
        evolving = merged;
        if part.past_end {
            tracing::debug!(
                path = %part.desc.path.display(),
                end = part.desc.end,
                scan_end = part.scan_end,
                "scanner ran past its range to finish a structure"
            );
        }
        cached.push(Cached {
            ls,
            in_state: filtered,
            base_start,
            eff_end: part.desc.end,
            absorbed,
        });
        if absorbed {
            // its range belongs to whoever scanned over it
            if let Some(j) = last_live {
                cached[j].eff_end = cached[j].eff_end.max(part.desc.end);
            }
        } else {
            last_live = Some(cached.len() - 1);
        }
        prev_end = prev_end.max(part.scan_end);
    }

    let mut emitted: Vec<PartitionDescriptor> = Vec::new();
    let mut next_start: Option<u64> = None;
    let mut next_path: Option<&PathBuf> = None;
    for i in (0..parts.len()).rev() {
        let part = &parts[i];
        if next_path != Some(&part.desc.path) {
            next_start = None;
            next_path = Some(&part.desc.path);
        }
        let c = &cached[i];
        if c.absorbed {
            continue;
        }
        let shifted = if c.ls.skip_levels > 0 {
            match consume_pending_closes(parts, &cached, i, c.ls.skip_levels) {
                Some(pos) => pos,
                // closes never materialize (truncated document): nothing to emit
                None => continue,
            }
        } else {
            c.base_start
        };
        let contracted = match next_start {
            Some(s) => c.eff_end.min(s),
            None => c.eff_end,
        };
        if shifted < contracted {
            emitted.push(PartitionDescriptor {
                path: part.desc.path.clone(),
                start: shifted,
                end: contracted,
                start_level: c.ls.start_level,
                dfa_state: c.ls.dfa_state,
                initial_state: c.ls.initial_state.clone(),
                id: 0,
            });
            next_start = Some(shifted);
        }
    }
    emitted.reverse();
    for (i, d) in emitted.iter_mut().enumerate() {
        d.id = i;
    }
    emitted
}

/// Walk forward from partition `i` consuming unmatched closing brackets from
/// the cached in-state stacks (same file) until `skip` have been consumed.
/// Opens encountered on the way open new contexts whose closes must be
/// repaid first. Returns the position just after the final close.
fn consume_pending_closes(
    parts: &[ScannedPartition],
    cached: &[Cached],
    i: usize,
    skip: u32,
) -> Option<u64> {
    let path = &parts[i].desc.path;
    let mut remaining = skip;
    let mut debt: u32 = 0;
    for j in i..parts.len() {
        if &parts[j].desc.path != path {
            break;
        }
        for e in &cached[j].in_state {
            if e.sym.is_open() {
                debt += 1;
            } else if e.sym.is_close() {
                if debt > 0 {
                    debt -= 1;
                } else {
                    remaining -= 1;
                    if remaining == 0 {
                        return Some(e.pos);
                    }
                }
            }
        }
    }
    None
}

/// Speculation variant: no skipping; each partition's end becomes the next
/// same-file start. That both contracts overlaps and extends a partition
/// over a successor that found no anchor (whose start was pushed to the
/// file end).
pub fn reconcile_speculative(parts: &[PartitionDescriptor]) -> Vec<PartitionDescriptor> {
    let mut emitted: Vec<PartitionDescriptor> = Vec::new();
    let mut next_start: Option<u64> = None;
    let mut next_path: Option<&PathBuf> = None;
    for d in parts.iter().rev() {
        if next_path != Some(&d.path) {
            next_start = None;
            next_path = Some(&d.path);
        }
        let end = next_start.unwrap_or(d.end);
        if d.start < end {
            let mut out = d.clone();
            out.end = end;
            emitted.push(out);
        }
        next_start = Some(d.start);
    }
    emitted.reverse();
    for (i, d) in emitted.iter_mut().enumerate() {
        d.id = i;
    }
    emitted
}
