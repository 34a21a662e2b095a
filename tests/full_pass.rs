#[path = "common/mod.rs"]
mod common;

use common::*;
use jsonshard::JsonPartitioner;

/// One small file, one partition: the whole document at root level.
#[test]
fn single_file_single_partition() {
    let content = r#"{"a":1,"b":2}"#;
    let (_dir, path) = write_doc("doc.json", content);
    let parts = JsonPartitioner::new()
        .filepath(path.to_string_lossy())
        .query("$.a")
        .partition_bytes(1024, 1024 * 1024)
        .partition_full()
        .unwrap();

    assert_eq!(parts.len(), 1);
    let p = &parts[0];
    assert_eq!((p.start, p.end), (0, 13));
    assert_eq!(p.start_level, 0);
    assert_eq!(p.dfa_state, 0);
    assert_eq!(p.initial_state, "");
    assert_eq!(p.id, 0);
}

/// A bucket boundary inside a string value: the second partition's start is
/// shifted to the first clean record boundary (just past the record's
/// closing brace), with the array as its ancestor.
#[test]
fn split_inside_string_realigns() {
    let content = r#"[{"name":"alice"},{"name":"bob"}]"#;
    let (_dir, path) = write_doc("doc.json", content);
    let parts = JsonPartitioner::new()
        .filepath(path.to_string_lossy())
        .query("$[*]")
        .partition_bytes(15, 1024 * 1024)
        .partition_full()
        .unwrap();

    assert_eq!(parts.len(), 2);
    assert_eq!((parts[0].start, parts[0].end), (0, 15));
    assert_eq!(parts[0].start_level, 0);

    assert_eq!((parts[1].start, parts[1].end), (17, 33));
    assert_eq!(parts[1].start_level, 1);
    assert_eq!(parts[1].dfa_state, 1);
    assert_eq!(parts[1].initial_state, "[");

    check_monotonic_cover(&parts);
    for p in &parts {
        assert!(bracket_balance_ok(
            content.as_bytes(),
            &p.initial_state,
            p.start as usize,
            p.end as usize
        ));
    }
}

/// Accept above the cut point: the open object below the accepted path must
/// be closed first, so the start advances past its closing brace.
#[test]
fn nested_skip_advances_start() {
    let content = r#"{"a":{"b":{"c":42}}}"#;
    let (_dir, path) = write_doc("doc.json", content);
    let parts = JsonPartitioner::new()
        .filepath(path.to_string_lossy())
        .query("$.a.b")
        .partition_bytes(15, 1024 * 1024)
        .partition_full()
        .unwrap();

    assert_eq!(parts.len(), 2);
    assert_eq!((parts[0].start, parts[0].end), (0, 15));

    // just past the `}` closing the "c" object at offset 17
    assert_eq!((parts[1].start, parts[1].end), (18, 20));
    assert_eq!(parts[1].start_level, 2);
    assert_eq!(parts[1].dfa_state, 2);
    assert_eq!(parts[1].initial_state, "{{");

    for p in &parts {
        assert!(bracket_balance_ok(
            content.as_bytes(),
            &p.initial_state,
            p.start as usize,
            p.end as usize
        ));
    }
}

/// A string value spanning several buckets: the buckets it swallows are
/// absorbed into their predecessor, later starts rebase onto the overrun
/// point, and the emitted cover stays monotonic.
#[test]
fn long_string_absorbs_buckets() {
    let content = format!(r#"{{"a":"{}","b":1}}"#, "x".repeat(40));
    assert_eq!(content.len(), 54);
    let (_dir, path) = write_doc("doc.json", &content);
    let parts = JsonPartitioner::new()
        .filepath(path.to_string_lossy())
        .query("$.b")
        .partition_bytes(16, 1024 * 1024)
        .partition_full()
        .unwrap();

    assert_eq!(parts.len(), 3);
    assert_eq!((parts[0].start, parts[0].end), (0, 32));
    assert_eq!((parts[1].start, parts[1].end), (47, 48));
    assert_eq!((parts[2].start, parts[2].end), (48, 54));
    check_monotonic_cover(&parts);
    for p in &parts {
        assert!(bracket_balance_ok(
            content.as_bytes(),
            &p.initial_state,
            p.start as usize,
            p.end as usize
        ));
    }
}

/// Two files: the ancestor stack resets between them and ordinals stay
/// global over the emitted sequence.
#[test]
fn multiple_files_reset_state() {
    let dir = tempfile::tempdir().unwrap().into_path();
    std::fs::write(dir.join("a.json"), r#"{"k":1}"#).unwrap();
    std::fs::write(dir.join("b.json"), r#"[1,2,3]"#).unwrap();

    let parts = JsonPartitioner::new()
        .filepath(format!("{}/*.json", dir.display()))
        .query("$.k")
        .partition_bytes(1024, 1024 * 1024)
        .partition_full()
        .unwrap();

    assert_eq!(parts.len(), 2);
    assert!(parts[0].path.ends_with("a.json"));
    assert!(parts[1].path.ends_with("b.json"));
    for (i, p) in parts.iter().enumerate() {
        assert_eq!(p.id, i);
        assert_eq!(p.start, 0);
        assert_eq!(p.start_level, 0);
    }
}

/// Many record-sized buckets over an array: every partition realigns onto a
/// record boundary and the whole cover is balanced.
#[test]
fn many_buckets_cover_invariants() {
    let mut records = Vec::new();
    for i in 0..40 {
        records.push(format!(r#"{{"id":{},"tag":"r{}"}}"#, i, i));
    }
    let content = format!("[{}]", records.join(","));
    let (_dir, path) = write_doc("doc.json", &content);

    let parts = JsonPartitioner::new()
        .filepath(path.to_string_lossy())
        .query("$[*]")
        .partition_bytes(64, 1024 * 1024)
        .partition_full()
        .unwrap();

    assert!(parts.len() > 2, "expected several partitions");
    assert_eq!(parts[0].start, 0);
    check_monotonic_cover(&parts);
    for p in &parts {
        assert!(
            bracket_balance_ok(
                content.as_bytes(),
                &p.initial_state,
                p.start as usize,
                p.end as usize
            ),
            "unbalanced partition {:?}",
            p
        );
    }
}
