mod bucket;
mod config;
mod cursor;
mod descriptor;
mod dfa;
mod executor;
mod fs;
mod merge;
mod pipeline;
mod progress;
mod project;
mod reconcile;
mod scanner;
mod skip;
mod speculate;
mod stats;
mod tokenizer;
mod util;

pub use crate::config::{
    PartitionOptions, DEFAULT_MAX_PARTITION_BYTES, DEFAULT_MIN_PARTITION_BYTES,
    DEFAULT_PARALLELISM,
};
pub use crate::descriptor::{PartitionDescriptor, StackEntry, StackSym};
pub use crate::pipeline::JsonPartitioner;

// Collaborator seams: custom stores, queries, and direct cursor access.
pub use crate::cursor::ByteCursor;
pub use crate::dfa::{Dfa, StateKind, Verdict};
pub use crate::fs::{FileStatus, FileSystem, LocalFs, ReadSeek};

// Engine stages, exposed for downstream parsers and for tests.
pub use crate::bucket::{bucketize, enumerate_files};
pub use crate::executor::map_collect;
pub use crate::merge::merge_syntax_stack;
pub use crate::project::{partition_level_skipping, LevelSkip};
pub use crate::reconcile::{reconcile_full, reconcile_speculative, ScannedPartition};
pub use crate::scanner::{end_state, EndState};
pub use crate::skip::skip;
pub use crate::speculate::{
    shift_to_anchor, AnchorEntry, SpeculationImpossible, SpeculationTable, FALLBACK_TOP_KEYS,
    MIN_ANCHOR_OCCURRENCES,
};
pub use crate::stats::{collect_stats, DocumentStats, TokenSighting};
pub use crate::tokenizer::{
    is_valid_string, next_token, read_string_at, skip_close_levels, Token,
};

// Robust file ops + tracing init so binaries can import from the crate root.
pub use crate::util::{init_tracing_once, open_with_backoff};
