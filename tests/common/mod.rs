#![allow(dead_code)] // each test binary uses a subset of these helpers

use jsonshard::{ByteCursor, FileSystem, LocalFs};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `content` to `name` under a fresh temp dir; returns (dir, path).
/// The directory is kept alive for the duration of the test run.
pub fn write_doc(name: &str, content: &str) -> (PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap().into_path();
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    (dir, path)
}

/// Open a cursor over a file at the given offset.
pub fn cursor_at(path: &Path, offset: u64) -> ByteCursor {
    let stream = LocalFs.open(path).unwrap();
    ByteCursor::new(stream, offset, 64 * 1024).unwrap()
}

/// Invariant check: the ancestor opens plus the partition's bytes never
/// close more brackets than are open.
pub fn bracket_balance_ok(content: &[u8], init: &str, start: usize, end: usize) -> bool {
    let mut depth: i64 = init.len() as i64;
    let mut in_string = false;
    let mut i = start;
    while i < end {
        let b = content[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match b {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    true
}

/// Per-file sanity: starts non-decreasing, ranges non-empty, no overlaps.
pub fn check_monotonic_cover(parts: &[jsonshard::PartitionDescriptor]) {
    for w in parts.windows(2) {
        if w[0].path == w[1].path {
            assert!(
                w[0].end <= w[1].start,
                "partitions overlap: [{}..{}) then [{}..{})",
                w[0].start,
                w[0].end,
                w[1].start,
                w[1].end
            );
        }
    }
    for p in parts {
        assert!(p.start < p.end, "empty partition emitted: {:?}", p);
    }
}
