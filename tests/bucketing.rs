#[path = "common/mod.rs"]
mod common;

use common::*;
use jsonshard::{bucketize, enumerate_files, JsonPartitioner, LocalFs, PartitionOptions};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;

/// A 100-byte file with a 32-byte minimum bucket yields four buckets, the
/// last truncated to the file end, covering the file contiguously.
#[test]
fn bucket_sizes_and_coverage() {
    let (_dir, path) = write_doc("data.json", &"x".repeat(100));
    let opts = PartitionOptions::default()
        .with_filepath(path.to_string_lossy())
        .with_partition_bytes(32, 1024 * 1024);

    let files = enumerate_files(&LocalFs, &opts).unwrap();
    assert_eq!(files.len(), 1);
    let buckets = bucketize(&files, &opts);

    let ranges: Vec<(u64, u64)> = buckets.iter().map(|b| (b.start, b.end)).collect();
    assert_eq!(ranges, vec![(0, 32), (32, 64), (64, 96), (96, 100)]);
    for (i, b) in buckets.iter().enumerate() {
        assert_eq!(b.id, i);
        assert_eq!(b.start_level, 0);
        assert_eq!(b.dfa_state, 0);
    }
}

/// A file smaller than the minimum bucket size becomes a single bucket.
#[test]
fn small_file_single_bucket() {
    let (_dir, path) = write_doc("small.json", r#"{"a":1,"b":2}"#);
    let opts = PartitionOptions::default()
        .with_filepath(path.to_string_lossy())
        .with_partition_bytes(1024, 1024 * 1024);

    let files = enumerate_files(&LocalFs, &opts).unwrap();
    let buckets = bucketize(&files, &opts);
    assert_eq!(buckets.len(), 1);
    assert_eq!((buckets[0].start, buckets[0].end), (0, 13));
}

/// Globs expand and the extra path filter prunes; non-matching extensions
/// are left out.
#[test]
fn glob_and_path_filter() {
    let (dir, _p) = write_doc("a.json", r#"{"k":1}"#);
    File::create(dir.join("b.json"))
        .unwrap()
        .write_all(br#"{"k":2}"#)
        .unwrap();
    File::create(dir.join("c.txt"))
        .unwrap()
        .write_all(b"not json")
        .unwrap();

    let opts = PartitionOptions::default()
        .with_filepath(format!("{}/*", dir.display()))
        .with_path_glob_filter("*.json");
    let files = enumerate_files(&LocalFs, &opts).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.json", "b.json"]);
}

/// No matching files is a diagnostic, not an error: the driver returns an
/// empty partition set.
#[test]
fn no_files_matched_returns_empty() {
    let dir = tempfile::tempdir().unwrap().into_path();
    let parts = JsonPartitioner::new()
        .filepath(format!("{}/*.json", dir.display()))
        .query("$[*]")
        .partition_full()
        .unwrap();
    assert!(parts.is_empty());
}

/// The string config surface round-trips every recognized key.
#[test]
fn options_from_map() {
    let mut map = HashMap::new();
    map.insert("filepath".to_string(), "/data/*.json".to_string());
    map.insert("recursive".to_string(), "true".to_string());
    map.insert("pathGlobFilter".to_string(), "*.json".to_string());
    map.insert("hdfsPath".to_string(), "hdfs://nn:9000".to_string());
    map.insert("encoding".to_string(), "UTF-8".to_string());
    map.insert("parallelism".to_string(), "16".to_string());
    map.insert("minPartitionBytes".to_string(), "1048576".to_string());
    map.insert("maxPartitionBytes".to_string(), "8388608".to_string());

    let opts = PartitionOptions::from_map(&map).unwrap();
    assert_eq!(opts.filepath, "/data/*.json");
    assert!(opts.recursive);
    assert_eq!(opts.path_glob_filter.as_deref(), Some("*.json"));
    assert_eq!(opts.hdfs_path.as_deref(), Some("hdfs://nn:9000"));
    assert_eq!(opts.parallelism, 16);
    assert_eq!(opts.min_partition_bytes, 1_048_576);
    assert_eq!(opts.max_partition_bytes, 8_388_608);
}

#[test]
fn options_from_map_rejects_bad_values() {
    let mut map = HashMap::new();
    map.insert("filepath".to_string(), "/data".to_string());
    map.insert("parallelism".to_string(), "lots".to_string());
    assert!(PartitionOptions::from_map(&map).is_err());

    let mut map = HashMap::new();
    map.insert("filepath".to_string(), "/data".to_string());
    map.insert("bogusKey".to_string(), "1".to_string());
    assert!(PartitionOptions::from_map(&map).is_err());

    // min above max
    let mut map = HashMap::new();
    map.insert("filepath".to_string(), "/data".to_string());
    map.insert("minPartitionBytes".to_string(), "100".to_string());
    map.insert("maxPartitionBytes".to_string(), "10".to_string());
    assert!(PartitionOptions::from_map(&map).is_err());

    // non-UTF-8 encodings are refused
    let mut map = HashMap::new();
    map.insert("filepath".to_string(), "/data".to_string());
    map.insert("encoding".to_string(), "UTF-16".to_string());
    assert!(PartitionOptions::from_map(&map).is_err());
}
