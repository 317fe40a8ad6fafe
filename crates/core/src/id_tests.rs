// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::new("k"), 42);
    assert_eq!(map.get("k"), Some(&42));
}

#[test]
fn define_id_serializes_transparently() {
    let id = TestId::new("8d3c");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"8d3c\"");
    let parsed: TestId = serde_json::from_str("\"8d3c\"").unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn define_id_compares_with_str() {
    let id: TestId = "abc".into();
    assert_eq!(id, "abc");
    assert!(!id.is_empty());
    assert!(TestId::new("").is_empty());
}
