#[path = "common/mod.rs"]
mod common;

use common::*;
use jsonshard::{end_state, is_valid_string, next_token, skip, StackEntry, StackSym};

// ---------------------------- skip scanner ----------------------------

/// Skipping a scalar stops just before the sibling comma.
#[test]
fn skip_scalar_to_delimiter() {
    let content = r#"{"a":12,"b":3}"#;
    let (_dir, path) = write_doc("doc.json", content);
    // cursor just past the '1' at offset 5
    let mut cur = cursor_at(&path, 6);
    let pos = skip(&mut cur, content.len() as u64, b'1').unwrap();
    assert_eq!(pos, 7);
    assert_eq!(cur.peek().unwrap(), Some(b','));
}

/// Escaped quotes inside a string are opaque; the scan stops before the
/// delimiter following the closing quote.
#[test]
fn skip_string_with_escapes() {
    let content = r#"["a\"b", 1]"#;
    let (_dir, path) = write_doc("doc.json", content);
    // cursor just past the opening quote at offset 1
    let mut cur = cursor_at(&path, 2);
    let pos = skip(&mut cur, content.len() as u64, b'"').unwrap();
    assert_eq!(pos, 7);
    assert_eq!(cur.peek().unwrap(), Some(b','));
}

/// A whole nested object is one value.
#[test]
fn skip_nested_object() {
    let content = r#"[{"x":[1,2]},3]"#;
    let (_dir, path) = write_doc("doc.json", content);
    // cursor just past the '{' at offset 1
    let mut cur = cursor_at(&path, 2);
    let pos = skip(&mut cur, content.len() as u64, b'{').unwrap();
    assert_eq!(pos, 12);
    assert_eq!(cur.peek().unwrap(), Some(b','));
}

// ---------------------------- end-state scanner ----------------------------

fn scan(content: &str, start: u64, end: u64) -> jsonshard::EndState {
    let (_dir, path) = write_doc("doc.json", content);
    let mut cur = cursor_at(&path, start);
    end_state(&mut cur, start, end).unwrap()
}

/// A balanced document scanned whole leaves nothing on the stack.
#[test]
fn end_state_balanced_document() {
    let content = r#"{"a":1,"b":2}"#;
    let es = scan(content, 0, content.len() as u64);
    assert!(es.stack.is_empty());
    assert_eq!(es.end, 13);
    assert!(!es.past_end);
}

/// Cut mid-string: the residual stack holds the open array, the open record
/// and its key; the scanner runs past the range end to finish the string.
#[test]
fn end_state_residual_midfile() {
    let content = r#"[{"name":"alice"},{"name":"bob"}]"#;
    let es = scan(content, 0, 15);
    assert_eq!(
        es.stack,
        vec![
            StackEntry::new(StackSym::OpenBracket, 1),
            StackEntry::new(StackSym::OpenBrace, 2),
            StackEntry::new(StackSym::Key("name".to_string()), 3),
        ]
    );
    assert_eq!(es.end, 16);
    assert!(es.past_end);
}

/// A partition opening on the tail of a split string resumes after its
/// closing quote and records the dangling closes.
#[test]
fn end_state_boundary_prelude() {
    let content = r#"[{"name":"alice"},{"name":"bob"}]"#;
    let es = scan(content, 15, 33);
    assert_eq!(
        es.stack,
        vec![
            StackEntry::new(StackSym::CloseBrace, 17),
            StackEntry::new(StackSym::CloseBracket, 33),
        ]
    );
    assert_eq!(es.end, 33);
    assert!(!es.past_end);
}

/// No quote in the residue: the prelude resets and the dangling closes of
/// the enclosing objects are all recorded.
#[test]
fn end_state_dangling_closes() {
    let content = r#"{"a":{"b":{"c":42}}}"#;
    let es = scan(content, 15, 20);
    assert_eq!(
        es.stack,
        vec![
            StackEntry::new(StackSym::CloseBrace, 18),
            StackEntry::new(StackSym::CloseBrace, 19),
            StackEntry::new(StackSym::CloseBrace, 20),
        ]
    );
}

/// Pops followed by pushes reuse stack slots without losing live entries.
#[test]
fn end_state_slot_reuse() {
    let content = r#"[[1],[2],{"a":"#;
    let es = scan(content, 0, content.len() as u64);
    assert_eq!(
        es.stack,
        vec![
            StackEntry::new(StackSym::OpenBracket, 1),
            StackEntry::new(StackSym::OpenBrace, 10),
            StackEntry::new(StackSym::Key("a".to_string()), 11),
        ]
    );
}

/// Sibling keys replace each other in place: only the last one per level
/// survives in the residual stack.
#[test]
fn end_state_sibling_key_overwrite() {
    let content = r#"{"first":1,"second":{"inner":"#;
    let es = scan(content, 0, content.len() as u64);
    let syms: Vec<&StackSym> = es.stack.iter().map(|e| &e.sym).collect();
    assert_eq!(
        syms,
        vec![
            &StackSym::OpenBrace,
            &StackSym::Key("second".to_string()),
            &StackSym::OpenBrace,
            &StackSym::Key("inner".to_string()),
        ]
    );
}

// ---------------------------- tokenizer ----------------------------

#[test]
fn valid_string_checks() {
    assert!(is_valid_string(b"plain tail"));
    assert!(is_valid_string(b"with \\\" escape"));
    assert!(!is_valid_string(b"bad \\q escape"));
    // a leading UTF-8 continuation byte (cut mid-codepoint) is tolerated
    assert!(is_valid_string(&[0x99, b'o', b'k']));
}

#[test]
fn next_token_spans() {
    let content = r#"{"alpha":1,"beta":"val"}"#;
    let (_dir, path) = write_doc("doc.json", content);
    let mut cur = cursor_at(&path, 0);
    let t = next_token(&mut cur, content.len() as u64).unwrap().unwrap();
    assert_eq!(t.text, "alpha");
    assert_eq!(t.start, 1);
    assert_eq!(t.end, 8);
    let t = next_token(&mut cur, content.len() as u64).unwrap().unwrap();
    assert_eq!(t.text, "beta");
    let t = next_token(&mut cur, content.len() as u64).unwrap().unwrap();
    assert_eq!(t.text, "val");
    assert!(next_token(&mut cur, content.len() as u64).unwrap().is_none());
}
