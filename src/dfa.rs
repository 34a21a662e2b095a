//! Projection DFA compiled from a JSONPath-like query. One state per path
//! component; the state index equals the number of components matched so
//! far, so index `states.len()` is the accepting state. The mutable cursor
//! (`check_token`/`to_next_state_if_array`) is used driver-side; the pure
//! `step_*` functions back it and let statistics collection fold states
//! without a cursor.

use anyhow::{bail, Result};

/// A single path component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateKind {
    /// `.name`, `.*`, `..name` — an object key; `descendant` marks `..`.
    Key { name: String, descendant: bool },
    /// `[*]` — any element of an array.
    AnyIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    Continue,
}

#[derive(Clone, Debug)]
pub struct Dfa {
    states: Vec<StateKind>,
    current: usize,
}

impl Dfa {
    /// Compile a query of the form `$`, `$.a.b`, `$..name`, `$[*].key`,
    /// `$.items[*].*`. Unsupported selectors (filters, slices, concrete
    /// indices) are rejected.
    pub fn from_query(query: &str) -> Result<Self> {
        let q = query.trim();
        let rest = match q.strip_prefix('$') {
            Some(r) => r,
            None => bail!("query must start with '$': {:?}", query),
        };
        let mut states = Vec::new();
        let bytes = rest.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'.' => {
                    let descendant = bytes.get(i + 1) == Some(&b'.');
                    i += if descendant { 2 } else { 1 };
                    let start = i;
                    while i < bytes.len() && bytes[i] != b'.' && bytes[i] != b'[' {
                        i += 1;
                    }
                    let name = &rest[start..i];
                    if name.is_empty() {
                        bail!("empty path component in query {:?}", query);
                    }
                    states.push(StateKind::Key {
                        name: name.to_string(),
                        descendant,
                    });
                }
                b'[' => {
                    if rest[i..].starts_with("[*]") {
                        states.push(StateKind::AnyIndex);
                        i += 3;
                    } else {
                        bail!("unsupported index selector in query {:?}", query);
                    }
                }
                _ => bail!("unexpected character at {:?} in query {:?}", &rest[i..], query),
            }
        }
        Ok(Self { states, current: 0 })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
    pub fn current_state(&self) -> usize {
        self.current
    }
    pub fn set_state(&mut self, s: usize) {
        self.current = s.min(self.states.len());
    }
    pub fn is_accept(&self) -> bool {
        self.is_accept_state(self.current)
    }
    pub fn is_accept_state(&self, s: usize) -> bool {
        s >= self.states.len()
    }

    /// Whether state `s` is a descendant (`..`) component.
    pub fn descendant_at(&self, s: usize) -> bool {
        matches!(
            self.states.get(s),
            Some(StateKind::Key { descendant: true, .. })
        )
    }

    /// A descendant component anywhere before `s` makes level bookkeeping
    /// loose: deeper levels than the component count are legal.
    fn loose_prefix(&self, s: usize) -> bool {
        self.states[..s.min(self.states.len())]
            .iter()
            .any(|k| matches!(k, StateKind::Key { descendant: true, .. }))
    }

    /// Pure array transition: the state reached if state `s` consumes an
    /// array opening at nesting `level`, or `None` if it does not.
    pub fn step_array(&self, s: usize, level: u32) -> Option<usize> {
        match self.states.get(s) {
            Some(StateKind::AnyIndex) => {
                let expected = (s + 1) as u64;
                let ok = if self.loose_prefix(s) {
                    level as u64 >= expected
                } else {
                    level as u64 == expected
                };
                if ok {
                    Some(s + 1)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Pure key transition: the state reached and the verdict when a key
    /// `token` is seen at nesting `level` in state `s`.
    pub fn step_key(&self, s: usize, token: &str, level: u32) -> (usize, Verdict) {
        if s >= self.states.len() {
            // Already inside an accepted subtree.
            return (s, Verdict::Accept);
        }
        match &self.states[s] {
            StateKind::Key { name, descendant: true } => {
                if name == token || name == "*" {
                    let n = s + 1;
                    (n, self.verdict_after(n))
                } else {
                    // The key may still appear deeper.
                    (s, Verdict::Continue)
                }
            }
            StateKind::Key { name, descendant: false } => {
                let expected = (s + 1) as u64;
                let level_ok = if self.loose_prefix(s) {
                    level as u64 >= expected
                } else {
                    level as u64 == expected
                };
                if !level_ok {
                    return (s, Verdict::Reject);
                }
                if name == token || name == "*" {
                    let n = s + 1;
                    (n, self.verdict_after(n))
                } else if self.loose_prefix(s) {
                    (s, Verdict::Continue)
                } else {
                    (s, Verdict::Reject)
                }
            }
            StateKind::AnyIndex => (s, Verdict::Reject), // object key where an array was expected
        }
    }

    fn verdict_after(&self, next: usize) -> Verdict {
        if next >= self.states.len() {
            Verdict::Accept
        } else {
            Verdict::Continue
        }
    }

    /// Cursor form of `step_key`: advances `current` and returns the verdict.
    pub fn check_token(&mut self, token: &str, level: u32) -> Verdict {
        let (next, verdict) = self.step_key(self.current, token, level);
        self.current = next;
        verdict
    }

    /// Cursor form of `step_array`: advances on success.
    pub fn to_next_state_if_array(&mut self, level: u32) -> bool {
        match self.step_array(self.current, level) {
            Some(next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    /// Cursor form of `descendant_at` for the current state.
    pub fn current_is_descendant(&self) -> bool {
        self.descendant_at(self.current)
    }
}
