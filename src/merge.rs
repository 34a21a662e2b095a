//! Stack merger: fold a successor's in-state stack into the predecessor's
//! residual ancestor stack, cancelling matched brackets.

use crate::descriptor::{StackEntry, StackSym};

/// Merge the evolving ancestor stack `prev` (valid at the successor's start)
/// with the successor's scanned in-state. Entries at or before `prev_end`
/// were already consumed by the predecessor's scanner and are dropped.
///
/// Returns the merged stack, valid at the successor's scan end, plus the
/// surviving in-state entries (with their positions) for the reconciler.
pub fn merge_syntax_stack(
    prev: &[StackEntry],
    in_state: &[StackEntry],
    prev_end: u64,
) -> (Vec<StackEntry>, Vec<StackEntry>) {
    let filtered: Vec<StackEntry> = in_state
        .iter()
        .filter(|e| e.pos > prev_end)
        .cloned()
        .collect();
    let mut merged: Vec<StackEntry> = prev.to_vec();
    for e in &filtered {
        match e.sym {
            StackSym::CloseBrace => {
                // A dangling `}` closes the predecessor's open object; when a
                // key sits on top it goes with its object.
                if matches!(merged.last().map(|x| &x.sym), Some(StackSym::OpenBrace)) {
                    merged.pop();
                } else {
                    merged.pop();
                    merged.pop();
                }
            }
            StackSym::CloseBracket => {
                merged.pop();
            }
            _ => merged.push(e.clone()),
        }
    }
    (merged, filtered)
}
