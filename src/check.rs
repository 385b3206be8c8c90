//! Expectation helpers over the [`FileIo`] surface.
//!
//! Thin wrappers for asserting on files written by code under test. They
//! panic with a descriptive message on mismatch, so they are meant to run
//! inside `#[test]` functions only.

use std::path::Path;

use serde_json::Value;

use crate::core::FileIo;

/// Asserts that `path` exists and is a regular file.
pub fn expect_file_exists(io: &dyn FileIo, path: &Path) {
    match io.stat(path) {
        Ok(info) => {
            if info.is_dir() {
                panic!("{} is a directory, expected a file", path.display());
            }
        }
        Err(err) => panic!("expected file {}: {err}", path.display()),
    }
}

fn read_json(io: &dyn FileIo, path: &Path) -> Value {
    expect_file_exists(io, path);
    let content = match io.read_file(path) {
        Ok(content) => content,
        Err(err) => panic!("cannot read {}: {err}", path.display()),
    };
    match serde_json::from_slice(&content) {
        Ok(value) => value,
        Err(err) => panic!("{} is not valid json: {err}", path.display()),
    }
}

/// Asserts that `path` holds exactly the JSON document `expected`
/// (structural comparison, formatting-insensitive).
pub fn expect_file_json(io: &dyn FileIo, path: &Path, expected: &Value) {
    let actual = read_json(io, path);
    if &actual != expected {
        panic!(
            "{} content mismatch:\ngot\n{}\nexpected\n{}",
            path.display(),
            serde_json::to_string_pretty(&actual).unwrap_or_default(),
            serde_json::to_string_pretty(expected).unwrap_or_default(),
        );
    }
}

/// Asserts that the JSON document at `path` contains `part` as a structural
/// subset (see [`json_contains`]).
pub fn expect_file_json_part(io: &dyn FileIo, path: &Path, part: &Value) {
    let actual = read_json(io, path);
    if !json_contains(&actual, part) {
        panic!(
            "{} does not contain expected subset:\ngot\n{}\nexpected subset\n{}",
            path.display(),
            serde_json::to_string_pretty(&actual).unwrap_or_default(),
            serde_json::to_string_pretty(part).unwrap_or_default(),
        );
    }
}

/// True if `part` is a structural subset of `all`: objects may omit keys,
/// arrays must match element-wise in full, every other value must be equal.
pub fn json_contains(all: &Value, part: &Value) -> bool {
    match (all, part) {
        (Value::Array(all), Value::Array(part)) => {
            all.len() == part.len()
                && all.iter().zip(part).all(|(a, p)| json_contains(a, p))
        }
        (Value::Object(all), Value::Object(part)) => part
            .iter()
            .all(|(k, v)| all.get(k).is_some_and(|a| json_contains(a, v))),
        _ => all == part,
    }
}
