use anyhow::{bail, Context, Result};
use std::collections::HashMap;

pub const DEFAULT_PARALLELISM: usize = 8;
pub const DEFAULT_MIN_PARTITION_BYTES: u64 = 32 * 1024 * 1024;
pub const DEFAULT_MAX_PARTITION_BYTES: u64 = 1024 * 1024 * 1024;

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct PartitionOptions {
    pub filepath: String,                 // file, directory, or glob pattern
    pub recursive: bool,                  // descend into subdirectories
    pub path_glob_filter: Option<String>, // extra glob applied to enumerated files
    pub hdfs_path: Option<String>,        // passed through to remote FileSystem impls
    pub encoding: String,                 // UTF-8 family only
    pub query: Option<String>,            // JSONPath-like projection query
    pub parallelism: usize,               // bucket-size divisor over total bytes
    pub min_partition_bytes: u64,
    pub max_partition_bytes: u64,
    pub file_concurrency: usize,          // workers in flight at once
    pub read_buffer_bytes: usize,         // BufReader capacity per worker
    pub progress: bool,
    pub progress_label: Option<String>,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            filepath: String::new(),
            recursive: false,
            path_glob_filter: None,
            hdfs_path: None,
            encoding: "UTF-8".to_string(),
            query: None,
            parallelism: DEFAULT_PARALLELISM,
            min_partition_bytes: DEFAULT_MIN_PARTITION_BYTES,
            max_partition_bytes: DEFAULT_MAX_PARTITION_BYTES,
            file_concurrency: DEFAULT_PARALLELISM,
            read_buffer_bytes: 256 * 1024,
            progress: false,
            progress_label: None,
        }
    }
}

impl PartitionOptions {
    /// Build options from the string key/value map used by the external config
    /// surface. Unknown keys are rejected to catch typos early.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut opts = Self::default();
        for (k, v) in map {
            match k.as_str() {
                "filepath" => opts.filepath = v.clone(),
                "recursive" => {
                    opts.recursive = v
                        .parse::<bool>()
                        .with_context(|| format!("recursive must be true|false, got {:?}", v))?;
                }
                "pathGlobFilter" => {
                    if !v.is_empty() {
                        opts.path_glob_filter = Some(v.clone());
                    }
                }
                "hdfsPath" => {
                    if !v.is_empty() {
                        opts.hdfs_path = Some(v.clone());
                    }
                }
                "encoding" => opts.encoding = v.clone(),
                "query" => opts.query = Some(v.clone()),
                "parallelism" => {
                    opts.parallelism = v
                        .parse::<usize>()
                        .with_context(|| format!("parallelism must be an integer, got {:?}", v))?;
                }
                "minPartitionBytes" => {
                    opts.min_partition_bytes = v.parse::<u64>().with_context(|| {
                        format!("minPartitionBytes must be an integer, got {:?}", v)
                    })?;
                }
                "maxPartitionBytes" => {
                    opts.max_partition_bytes = v.parse::<u64>().with_context(|| {
                        format!("maxPartitionBytes must be an integer, got {:?}", v)
                    })?;
                }
                other => bail!("unrecognized option key: {}", other),
            }
        }
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if self.filepath.is_empty() {
            bail!("filepath is required");
        }
        if self.parallelism == 0 {
            bail!("parallelism must be >= 1");
        }
        if self.min_partition_bytes == 0 || self.min_partition_bytes > self.max_partition_bytes {
            bail!(
                "invalid partition byte bounds: min={} max={}",
                self.min_partition_bytes,
                self.max_partition_bytes
            );
        }
        // The scanners are byte-oriented over ASCII delimiters; only UTF-8
        // family encodings keep multi-byte content opaque to them.
        let enc = self.encoding.to_ascii_lowercase();
        if enc != "utf-8" && enc != "utf8" {
            bail!("unsupported encoding: {} (only UTF-8 is supported)", self.encoding);
        }
        Ok(())
    }

    pub fn with_filepath(mut self, p: impl Into<String>) -> Self {
        self.filepath = p.into();
        self
    }
    pub fn with_recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }
    pub fn with_path_glob_filter(mut self, glob: impl Into<String>) -> Self {
        let g = glob.into();
        self.path_glob_filter = if g.is_empty() { None } else { Some(g) };
        self
    }
    pub fn with_hdfs_path(mut self, p: impl Into<String>) -> Self {
        self.hdfs_path = Some(p.into());
        self
    }
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.query = Some(q.into());
        self
    }
    pub fn with_parallelism(mut self, n: usize) -> Self {
        self.parallelism = n.max(1);
        self
    }
    pub fn with_partition_bytes(mut self, min: u64, max: u64) -> Self {
        self.min_partition_bytes = min.max(1);
        self.max_partition_bytes = max.max(self.min_partition_bytes);
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
}
