use crate::config::PartitionOptions;
use crate::descriptor::PartitionDescriptor;
use crate::fs::{FileStatus, FileSystem};
use anyhow::{Context, Result};
use globset::GlobBuilder;
use std::path::Path;

fn has_glob_meta(s: &str) -> bool {
    s.chars().any(|c| matches!(c, '*' | '?' | '[' | '{'))
}

/// Enumerate the files selected by `filepath`, expanding globs and
/// directories and applying the optional path glob filter.
pub fn enumerate_files(fs: &dyn FileSystem, opts: &PartitionOptions) -> Result<Vec<FileStatus>> {
    let mut files = if has_glob_meta(&opts.filepath) {
        fs.glob(&opts.filepath)?
    } else {
        let status = fs.status(Path::new(&opts.filepath))?;
        if status.is_dir {
            fs.list_files(&status.path, opts.recursive)?
        } else {
            vec![status]
        }
    };
    if let Some(filter) = &opts.path_glob_filter {
        let matcher = GlobBuilder::new(filter)
            .literal_separator(false)
            .build()
            .with_context(|| format!("bad pathGlobFilter {:?}", filter))?
            .compile_matcher();
        files.retain(|f| matcher.is_match(&f.path));
    }
    files.retain(|f| f.len > 0);
    Ok(files)
}

/// Cut each file into equal byte buckets. The bucket size is the corpus
/// total divided by the parallelism target, clamped to the configured
/// min/max; the last bucket of a file is truncated to the file end.
pub fn bucketize(files: &[FileStatus], opts: &PartitionOptions) -> Vec<PartitionDescriptor> {
    let total: u64 = files.iter().map(|f| f.len).sum();
    if total == 0 {
        return Vec::new();
    }
    let target = total.div_ceil(opts.parallelism.max(1) as u64);
    let bucket_size = target.clamp(opts.min_partition_bytes, opts.max_partition_bytes);
    let mut out = Vec::new();
    for f in files {
        let mut start = 0;
        while start < f.len {
            let end = (start + bucket_size).min(f.len);
            out.push(PartitionDescriptor::raw(f.path.clone(), start, end));
            start = end;
        }
    }
    for (i, d) in out.iter_mut().enumerate() {
        d.id = i;
    }
    out
}
