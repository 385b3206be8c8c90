//! Fixture text normalizers.
//!
//! Test fixtures written inline in source tend to carry the indentation of
//! the surrounding code and editor tabs. These helpers bring them into a
//! canonical form so expected output can be compared byte for byte.

use serde_json::Value;

/// Pretty-prints a JSON object with two-space indentation and sorted keys.
///
/// # Panics
///
/// Panics if `input` is not valid JSON; a broken fixture is a programming
/// error in the test itself.
pub fn nice_json(input: &str) -> String {
    let data: Value = match serde_json::from_str(input) {
        Ok(data) => data,
        Err(err) => panic!("invalid test json: {err}"),
    };
    match serde_json::to_string_pretty(&data) {
        Ok(result) => result,
        Err(err) => panic!("unexpected json marshal error: {err}"),
    }
}

/// Normalizes an inline YAML fixture: expands tabs to two-space stops,
/// strips control characters, removes the common leading indentation and
/// drops blank lines. Every remaining line ends with a newline.
pub fn nice_yaml(input: &str) -> String {
    const TAB_STOP: usize = 2;

    let mut expanded = String::with_capacity(input.len());
    let mut col = 0usize;
    for ch in input.chars() {
        if ch == '\n' {
            col = 0;
        } else if ch == '\t' {
            expanded.push(' ');
            col += 1;
            while col % TAB_STOP != 0 {
                expanded.push(' ');
                col += 1;
            }
            continue;
        } else if (ch as u32) < 32 {
            continue;
        } else {
            col += 1;
        }
        expanded.push(ch);
    }

    let lines: Vec<&str> = expanded.split('\n').collect();

    let mut min_indent = expanded.len();
    for line in &lines {
        if line.is_empty() {
            continue;
        }
        let spaces = line.len() - line.trim_start_matches(' ').len();
        if spaces < min_indent && spaces < line.len() {
            min_indent = spaces;
        }
    }

    let mut out = String::with_capacity(expanded.len());
    for line in &lines {
        if line.len() > min_indent {
            let text = &line[min_indent..];
            if !text.is_empty() {
                out.push_str(text);
                out.push('\n');
            }
        }
    }
    out
}
