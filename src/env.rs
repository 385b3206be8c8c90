//! Process-environment doubles.
//!
//! `EnvIo` mirrors the process-environment surface so code under test can be
//! pointed at either the real environment ([`OsEnv`]) or a flat in-memory
//! copy ([`MemEnv`]) seeded from it.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("invalid environment key: {0:?}")]
    InvalidKey(String),
}

/// Environment-variable operation surface.
pub trait EnvIo {
    /// Returns the value for `key`, or the empty string if unset.
    fn getenv(&self, key: &str) -> String;
    fn setenv(&mut self, key: &str, val: &str) -> Result<(), EnvError>;
    fn unsetenv(&mut self, key: &str) -> Result<(), EnvError>;
    /// All variables as `KEY=value` strings, sorted by key.
    fn environ(&self) -> Vec<String>;
    fn clearenv(&mut self);
    fn lookup_env(&self, key: &str) -> Option<String>;
    /// Substitutes `$NAME` and `${NAME}` references in `input`; unset names
    /// expand to the empty string.
    fn expand_env(&self, input: &str) -> String;
}

fn valid_key(key: &str) -> Result<(), EnvError> {
    if key.is_empty() || key.contains('=') || key.contains('\0') {
        return Err(EnvError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn expand(input: &str, lookup: &dyn Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('{') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if closed {
                    out.push_str(&lookup(&name));
                } else {
                    // unterminated reference is kept verbatim
                    out.push_str("${");
                    out.push_str(&name);
                }
            }
            Some(&c) if c.is_ascii_alphanumeric() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&lookup(&name));
            }
            _ => out.push('$'),
        }
    }
    out
}

/// [`EnvIo`] implementation backed by the real process environment.
///
/// Mutations are process-global; use it only where that is the point.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEnv;

impl OsEnv {
    pub fn new() -> Self {
        OsEnv
    }
}

impl EnvIo for OsEnv {
    fn getenv(&self, key: &str) -> String {
        std::env::var(key).unwrap_or_default()
    }

    fn setenv(&mut self, key: &str, val: &str) -> Result<(), EnvError> {
        valid_key(key)?;
        // SAFETY: the kit assumes a single logical owner of the process
        // environment; tests that mutate it must not run concurrently.
        unsafe { std::env::set_var(key, val) };
        Ok(())
    }

    fn unsetenv(&mut self, key: &str) -> Result<(), EnvError> {
        valid_key(key)?;
        // SAFETY: see `setenv`.
        unsafe { std::env::remove_var(key) };
        Ok(())
    }

    fn environ(&self) -> Vec<String> {
        let mut list: Vec<String> = std::env::vars()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        list.sort();
        list
    }

    fn clearenv(&mut self) {
        for (key, _) in std::env::vars() {
            // SAFETY: see `setenv`.
            unsafe { std::env::remove_var(&key) };
        }
    }

    fn lookup_env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn expand_env(&self, input: &str) -> String {
        expand(input, &|name| self.getenv(name))
    }
}

/// In-memory [`EnvIo`] double, seeded with a copy of the process environment
/// at construction. Mutations never touch the real environment.
#[derive(Debug, Clone)]
pub struct MemEnv {
    vars: HashMap<String, String>,
}

impl MemEnv {
    pub fn new() -> Self {
        MemEnv {
            vars: std::env::vars().collect(),
        }
    }

    /// An environment with no variables at all.
    pub fn empty() -> Self {
        MemEnv {
            vars: HashMap::new(),
        }
    }
}

impl Default for MemEnv {
    fn default() -> Self {
        MemEnv::new()
    }
}

impl EnvIo for MemEnv {
    fn getenv(&self, key: &str) -> String {
        self.vars.get(key).cloned().unwrap_or_default()
    }

    fn setenv(&mut self, key: &str, val: &str) -> Result<(), EnvError> {
        valid_key(key)?;
        self.vars.insert(key.to_string(), val.to_string());
        Ok(())
    }

    fn unsetenv(&mut self, key: &str) -> Result<(), EnvError> {
        valid_key(key)?;
        self.vars.remove(key);
        Ok(())
    }

    fn environ(&self) -> Vec<String> {
        let mut list: Vec<String> = self.vars.iter().map(|(k, v)| format!("{k}={v}")).collect();
        list.sort();
        list
    }

    fn clearenv(&mut self) {
        self.vars.clear();
    }

    fn lookup_env(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn expand_env(&self, input: &str) -> String {
        expand(input, &|name| self.getenv(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_env() -> MemEnv {
        let mut env = MemEnv::empty();
        env.setenv("HOME", "/home/user").unwrap();
        env.setenv("SHELL", "/bin/sh").unwrap();
        env
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut env = MemEnv::empty();
        env.setenv("KEY", "value").unwrap();

        assert_eq!(env.getenv("KEY"), "value");
        assert_eq!(env.lookup_env("KEY"), Some("value".to_string()));
    }

    #[test]
    fn test_unset_and_missing() {
        let mut env = setup_env();
        env.unsetenv("HOME").unwrap();

        assert_eq!(env.getenv("HOME"), "");
        assert_eq!(env.lookup_env("HOME"), None);
        // unsetting a missing key is fine
        env.unsetenv("HOME").unwrap();
    }

    #[test]
    fn test_key_with_separator_is_rejected() {
        let mut env = MemEnv::empty();
        assert_eq!(
            env.setenv("A=B", "x"),
            Err(EnvError::InvalidKey("A=B".to_string()))
        );
        assert!(env.unsetenv("A=B").is_err());
        assert!(env.setenv("", "x").is_err());
    }

    #[test]
    fn test_environ_is_sorted_key_value_pairs() {
        let env = setup_env();
        assert_eq!(env.environ(), vec!["HOME=/home/user", "SHELL=/bin/sh"]);
    }

    #[test]
    fn test_clearenv() {
        let mut env = setup_env();
        env.clearenv();
        assert!(env.environ().is_empty());
    }

    #[test]
    fn test_new_copies_process_environment() {
        let real: Vec<(String, String)> = std::env::vars().collect();
        let env = MemEnv::new();
        for (k, v) in real {
            assert_eq!(env.lookup_env(&k), Some(v));
        }
    }

    #[test]
    fn test_mutations_do_not_leak_to_process() {
        let mut env = MemEnv::new();
        env.setenv("TESTIO_KIT_PRIVATE", "1").unwrap();
        assert!(std::env::var("TESTIO_KIT_PRIVATE").is_err());
    }

    mod expand {
        use super::*;

        #[test]
        fn test_plain_and_braced_references() {
            let env = setup_env();
            assert_eq!(env.expand_env("home is $HOME"), "home is /home/user");
            assert_eq!(env.expand_env("${SHELL} -c"), "/bin/sh -c");
            assert_eq!(env.expand_env("$HOME/bin:$HOME/.local"), "/home/user/bin:/home/user/.local");
        }

        #[test]
        fn test_unknown_names_expand_to_empty() {
            let env = setup_env();
            assert_eq!(env.expand_env("x${NOPE}y"), "xy");
            assert_eq!(env.expand_env("$NOPE"), "");
        }

        #[test]
        fn test_literal_dollar_is_preserved() {
            let env = setup_env();
            assert_eq!(env.expand_env("cost: $ 5"), "cost: $ 5");
            assert_eq!(env.expand_env("trailing $"), "trailing $");
            assert_eq!(env.expand_env("${unterminated"), "${unterminated");
        }
    }
}
