use crate::bucket::{bucketize, enumerate_files};
use crate::config::PartitionOptions;
use crate::cursor::ByteCursor;
use crate::descriptor::PartitionDescriptor;
use crate::dfa::Dfa;
use crate::executor::map_collect;
use crate::fs::{FileSystem, LocalFs};
use crate::progress::{make_progress_bar_labeled, total_bucket_bytes};
use crate::reconcile::{reconcile_full, reconcile_speculative, ScannedPartition};
use crate::scanner::end_state;
use crate::speculate::{shift_to_anchor, SpeculationTable};
use crate::stats::{collect_stats, DocumentStats};
use crate::util::init_tracing_once;
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level driver: plan buckets, fan the per-bucket work out over the
/// executor, reconcile on the driver. Build with the chaining methods, then
/// run `collect_stats`, `partition_full`, or `partition_speculative`.
#[derive(Clone)]
pub struct JsonPartitioner {
    opts: PartitionOptions,
    fs: Arc<dyn FileSystem>,
}

impl JsonPartitioner {
    pub fn new() -> Self {
        Self {
            opts: PartitionOptions::default(),
            fs: Arc::new(LocalFs),
        }
    }

    pub fn from_options(opts: PartitionOptions) -> Self {
        Self {
            opts,
            fs: Arc::new(LocalFs),
        }
    }

    /// Construct from the string key/value config surface.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        Ok(Self::from_options(PartitionOptions::from_map(map)?))
    }

    // -------- Builder methods --------
    pub fn filepath(mut self, p: impl Into<String>) -> Self { self.opts = self.opts.with_filepath(p); self }
    pub fn recursive(mut self, yes: bool) -> Self { self.opts = self.opts.with_recursive(yes); self }
    pub fn path_glob_filter(mut self, glob: impl Into<String>) -> Self { self.opts = self.opts.with_path_glob_filter(glob); self }
    pub fn hdfs_path(mut self, p: impl Into<String>) -> Self { self.opts = self.opts.with_hdfs_path(p); self }
    pub fn query(mut self, q: impl Into<String>) -> Self { self.opts = self.opts.with_query(q); self }
    pub fn parallelism(mut self, n: usize) -> Self { self.opts = self.opts.with_parallelism(n); self }
    pub fn partition_bytes(mut self, min: u64, max: u64) -> Self { self.opts = self.opts.with_partition_bytes(min, max); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }

    /// Swap the filesystem collaborator (remote stores, test doubles).
    pub fn filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn options(&self) -> &PartitionOptions {
        &self.opts
    }

    fn dfa(&self) -> Result<Dfa> {
        let q = self
            .opts
            .query
            .as_deref()
            .ok_or_else(|| anyhow!("query is required (e.g. \"$[*]\")"))?;
        Dfa::from_query(q)
    }

    fn plan(&self) -> Result<Vec<PartitionDescriptor>> {
        self.opts.validate()?;
        let files = enumerate_files(self.fs.as_ref(), &self.opts)?;
        if files.is_empty() {
            tracing::warn!(filepath = %self.opts.filepath, "no files matched the selection");
            return Ok(Vec::new());
        }
        let buckets = bucketize(&files, &self.opts);
        tracing::info!(files = files.len(), buckets = buckets.len(), "planned raw buckets");
        Ok(buckets)
    }

    /// Sample the head of every selected file and aggregate key statistics
    /// for the speculation table.
    pub fn collect_stats(&self, sample_bytes: u64) -> Result<DocumentStats> {
        init_tracing_once();
        self.opts.validate()?;
        let dfa = self.dfa()?;
        let files = enumerate_files(self.fs.as_ref(), &self.opts)?;
        let mut stats = DocumentStats::new();
        for f in &files {
            let stream = self.fs.open(&f.path)?;
            let mut cur = ByteCursor::new(stream, 0, self.opts.read_buffer_bytes)?;
            let part = collect_stats(&mut cur, sample_bytes.min(f.len), &dfa)
                .with_context(|| format!("collecting stats from {}", f.path.display()))?;
            stats.merge(&part);
        }
        Ok(stats)
    }

    /// Exact two-phase strategy: scan every bucket once for its residual
    /// syntactic stack, then reconcile neighbors into final descriptors.
    pub fn partition_full(&self) -> Result<Vec<PartitionDescriptor>> {
        init_tracing_once();
        let mut dfa = self.dfa()?;
        let buckets = self.plan()?;
        if buckets.is_empty() {
            return Ok(Vec::new());
        }

        let pb = if self.opts.progress {
            Some(make_progress_bar_labeled(
                total_bucket_bytes(&buckets),
                self.opts.progress_label.as_deref(),
            ))
        } else {
            None
        };
        let fs = self.fs.clone();
        let read_buf = self.opts.read_buffer_bytes;

        let scanned = map_collect(&buckets, self.opts.file_concurrency, |desc| {
            let stream = fs.open(&desc.path)?;
            let mut cur = ByteCursor::new(stream, desc.start, read_buf)?;
            let es = end_state(&mut cur, desc.start, desc.end).with_context(|| {
                format!(
                    "scanning {} [{}..{})",
                    desc.path.display(),
                    desc.start,
                    desc.end
                )
            })?;
            if let Some(pb) = &pb {
                pb.inc(desc.end - desc.start);
            }
            Ok(ScannedPartition {
                desc: desc.clone(),
                stack: es.stack,
                scan_end: es.end,
                past_end: es.past_end,
            })
        })?;
        if let Some(pb) = pb {
            pb.finish_with_message("scanned");
        }

        let out = reconcile_full(&scanned, &mut dfa);
        tracing::info!(emitted = out.len(), "full-pass reconciliation complete");
        Ok(out)
    }

    /// Speculation strategy: build the anchor table from `stats`, shift each
    /// bucket to its anchor, contract ends. Fails with
    /// `SpeculationImpossible` when no anchor qualifies.
    pub fn partition_speculative(&self, stats: &DocumentStats) -> Result<Vec<PartitionDescriptor>> {
        init_tracing_once();
        let table = SpeculationTable::from_stats(stats)?;
        let buckets = self.plan()?;
        if buckets.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!(anchors = table.len(), "speculation table ready");

        // file sizes: the last bucket of each file ends at its size
        let mut sizes: HashMap<PathBuf, u64> = HashMap::new();
        for d in &buckets {
            let s = sizes.entry(d.path.clone()).or_insert(0);
            *s = (*s).max(d.end);
        }

        let pb = if self.opts.progress {
            Some(make_progress_bar_labeled(
                total_bucket_bytes(&buckets),
                self.opts.progress_label.as_deref(),
            ))
        } else {
            None
        };
        let fs = self.fs.clone();
        let read_buf = self.opts.read_buffer_bytes;

        let shifted = map_collect(&buckets, self.opts.file_concurrency, |desc| {
            let file_size = sizes[&desc.path];
            let stream = fs.open(&desc.path)?;
            let mut cur = ByteCursor::new(stream, desc.start, read_buf)?;
            let out = shift_to_anchor(&mut cur, desc, &table, file_size).with_context(|| {
                format!(
                    "anchoring {} [{}..{})",
                    desc.path.display(),
                    desc.start,
                    desc.end
                )
            })?;
            if let Some(pb) = &pb {
                pb.inc(desc.end - desc.start);
            }
            Ok(out)
        })?;
        if let Some(pb) = pb {
            pb.finish_with_message("anchored");
        }

        let out = reconcile_speculative(&shifted);
        tracing::info!(emitted = out.len(), "speculative reconciliation complete");
        Ok(out)
    }
}

impl Default for JsonPartitioner {
    fn default() -> Self {
        Self::new()
    }
}
