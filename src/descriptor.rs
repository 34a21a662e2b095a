use serde::Serialize;
use std::path::PathBuf;

/// A byte range of one file annotated with the syntactic metadata that makes
/// parsing it in isolation safe.
///
/// `initial_state` lists the ancestor opens from the document root down to
/// `start`, one `{` or `[` character per level; the full pass fills it, the
/// speculation path leaves it empty.
#[derive(Clone, Debug, Serialize)]
pub struct PartitionDescriptor {
    pub path: PathBuf,
    pub start: u64,
    pub end: u64, // half-open [start, end)
    pub start_level: u32,
    pub dfa_state: u32,
    pub initial_state: String,
    pub id: usize,
}

impl PartitionDescriptor {
    /// A raw bucket before any syntactic analysis: root level, DFA state 0.
    pub fn raw(path: PathBuf, start: u64, end: u64) -> Self {
        Self {
            path,
            start,
            end,
            start_level: 0,
            dfa_state: 0,
            initial_state: String::new(),
            id: 0,
        }
    }
}

/// One element of a syntactic stack: an unmatched open, an unmatched close
/// seen before its open (dangling, at a partition boundary), or an object key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackSym {
    OpenBrace,
    OpenBracket,
    CloseBrace,
    CloseBracket,
    Key(String),
}

impl StackSym {
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, StackSym::OpenBrace | StackSym::OpenBracket)
    }
    #[inline]
    pub fn is_close(&self) -> bool {
        matches!(self, StackSym::CloseBrace | StackSym::CloseBracket)
    }
    /// The bracket character for open symbols.
    pub fn open_char(&self) -> Option<char> {
        match self {
            StackSym::OpenBrace => Some('{'),
            StackSym::OpenBracket => Some('['),
            _ => None,
        }
    }
}

/// Stack element paired with the byte offset just after the token's byte.
/// For keys the token is the opening quote, so `pos - 1` is the quote itself
/// and the key content can be re-read from `pos`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackEntry {
    pub sym: StackSym,
    pub pos: u64,
}

impl StackEntry {
    pub fn new(sym: StackSym, pos: u64) -> Self {
        Self { sym, pos }
    }
}
