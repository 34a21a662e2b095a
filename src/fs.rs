//! Filesystem collaborator: enumeration, glob matching, and seekable streams.
//! `LocalFs` is the default; remote stores plug in behind the same trait.

use crate::util::open_with_backoff;
use anyhow::{Context, Result};
use globset::GlobBuilder;
use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Clone, Debug)]
pub struct FileStatus {
    pub path: PathBuf,
    pub is_dir: bool,
    pub len: u64,
}

/// Seekable byte stream handed to the partition scanners.
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

pub trait FileSystem: Send + Sync {
    fn list_files(&self, root: &Path, recursive: bool) -> Result<Vec<FileStatus>>;
    fn glob(&self, pattern: &str) -> Result<Vec<FileStatus>>;
    fn status(&self, path: &Path) -> Result<FileStatus>;
    fn open(&self, path: &Path) -> Result<Box<dyn ReadSeek>>;
}

/// Local-disk implementation on `walkdir` + `globset`.
pub struct LocalFs;

impl LocalFs {
    fn status_of(path: &Path) -> Result<FileStatus> {
        let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        Ok(FileStatus {
            path: path.to_path_buf(),
            is_dir: meta.is_dir(),
            len: meta.len(),
        })
    }
}

/// The literal directory prefix of a glob pattern (everything before the
/// first component containing a metacharacter). Used as the walk root.
fn non_glob_prefix(pattern: &str) -> PathBuf {
    let meta_at = pattern
        .find(|c| matches!(c, '*' | '?' | '[' | '{'))
        .unwrap_or(pattern.len());
    let prefix = &pattern[..meta_at];
    match prefix.rfind(['/', '\\']) {
        Some(i) => PathBuf::from(&prefix[..=i]),
        None => PathBuf::new(),
    }
}

impl FileSystem for LocalFs {
    fn list_files(&self, root: &Path, recursive: bool) -> Result<Vec<FileStatus>> {
        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut out = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(max_depth) {
            let ent = entry.with_context(|| format!("walk {}", root.display()))?;
            if ent.file_type().is_file() {
                out.push(Self::status_of(ent.path())?);
            }
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<FileStatus>> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .with_context(|| format!("bad glob pattern {:?}", pattern))?
            .compile_matcher();
        let mut base = non_glob_prefix(pattern);
        if base.as_os_str().is_empty() {
            base = PathBuf::from(".");
        }
        let mut out = Vec::new();
        for entry in WalkDir::new(&base).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && matcher.is_match(entry.path()) {
                out.push(Self::status_of(entry.path())?);
            }
        }
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    fn status(&self, path: &Path) -> Result<FileStatus> {
        Self::status_of(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ReadSeek>> {
        let f = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
        Ok(Box::new(f))
    }
}
