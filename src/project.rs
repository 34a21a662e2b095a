//! DFA projector: walk an ancestor stack through the projection DFA and
//! derive a partition's start level, pending skip levels, and DFA state.

use crate::descriptor::{StackEntry, StackSym};
use crate::dfa::{Dfa, Verdict};

/// Projection of one ancestor stack.
#[derive(Clone, Debug, Default)]
pub struct LevelSkip {
    pub start_level: u32,
    /// Opens below the stop point: contexts the downstream parser must close
    /// before its first record boundary.
    pub skip_levels: u32,
    pub dfa_state: u32,
    /// Ancestor opens above the stop point, root-to-leaf.
    pub initial_state: String,
}

/// Walk `stack` through the DFA, stopping at the first accept or reject.
/// `{` always deepens the level; `[` deepens it only when the DFA consumes
/// the array or the current state is a descendant. Opens after the stop
/// point become `skip_levels`; opens up to it become `initial_state`.
pub fn partition_level_skipping(stack: &[StackEntry], dfa: &mut Dfa) -> LevelSkip {
    dfa.reset();
    let mut level: u32 = 0;
    let mut prefix_end = stack.len();
    for (i, entry) in stack.iter().enumerate() {
        let mut stopped = false;
        match &entry.sym {
            StackSym::OpenBracket => {
                if dfa.to_next_state_if_array(level + 1) {
                    level += 1;
                    if dfa.is_accept() {
                        stopped = true;
                    }
                } else if dfa.current_is_descendant() {
                    level += 1;
                }
            }
            StackSym::OpenBrace => level += 1,
            StackSym::Key(k) => match dfa.check_token(k, level) {
                Verdict::Accept | Verdict::Reject => stopped = true,
                Verdict::Continue => {}
            },
            StackSym::CloseBrace | StackSym::CloseBracket => {
                // merged stacks carry no closes; tolerate them anyway
                level = level.saturating_sub(1);
            }
        }
        if stopped {
            prefix_end = i + 1;
            break;
        }
    }
    let initial_state: String = stack[..prefix_end]
        .iter()
        .filter_map(|e| e.sym.open_char())
        .collect();
    let skip_levels = stack[prefix_end..]
        .iter()
        .filter(|e| e.sym.is_open())
        .count() as u32;
    LevelSkip {
        start_level: level,
        skip_levels,
        dfa_state: dfa.current_state() as u32,
        initial_state,
    }
}
