//! Fault injection for the in-memory filesystem.
//!
//! Two independent tiers: persistent hooks keyed by operation name, which
//! validate every call, and one-shot forced errors keyed by operation name or
//! by path, which fire exactly once and are then removed. Every `MemFs`
//! operation consults this state before touching the store.

use std::collections::HashMap;
use std::path::Path;

use crate::core::{FsError, Result};

/// Validator invoked with the path arguments of every call to the operation
/// it is registered for. Returning an error aborts the operation; the hook
/// stays registered.
pub type FaultHook = Box<dyn Fn(&[&Path]) -> Result<()>>;

#[derive(Default)]
pub(crate) struct Faults {
    hooks: HashMap<String, FaultHook>,
    forced: HashMap<String, FsError>,
}

impl Faults {
    pub(crate) fn set_hook(&mut self, api: impl Into<String>, hook: FaultHook) {
        self.hooks.insert(api.into(), hook);
    }

    pub(crate) fn clear_hook(&mut self, api: &str) {
        self.hooks.remove(api);
    }

    pub(crate) fn force_error(&mut self, key: impl Into<String>, err: FsError) {
        self.forced.insert(key.into(), err);
    }

    /// Checks the hook for `api`, then the forced-error map under `api` and
    /// then under each path argument in order. A matched forced entry is
    /// removed before its error is returned, making it one-shot.
    pub(crate) fn get_error(&mut self, api: &str, paths: &[&Path]) -> Result<()> {
        if let Some(hook) = self.hooks.get(api) {
            hook(paths)?;
        }

        let mut key = None;
        if self.forced.contains_key(api) {
            key = Some(api.to_string());
        } else {
            for p in paths {
                let p = p.to_string_lossy();
                if self.forced.contains_key(p.as_ref()) {
                    key = Some(p.into_owned());
                    break;
                }
            }
        }

        match key {
            Some(key) => Err(self.forced.remove(&key).unwrap()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injected(msg: &str) -> FsError {
        FsError::Injected(msg.to_string())
    }

    #[test]
    fn forced_error_by_api_fires_once() {
        let mut faults = Faults::default();
        faults.force_error("write_file", injected("disk full"));

        let err = faults
            .get_error("write_file", &[Path::new("/a")])
            .unwrap_err();
        assert!(matches!(err, FsError::Injected(msg) if msg == "disk full"));

        // consumed
        assert!(faults.get_error("write_file", &[Path::new("/a")]).is_ok());
    }

    #[test]
    fn forced_error_by_path_fires_once() {
        let mut faults = Faults::default();
        faults.force_error("/a/b", injected("boom"));

        assert!(faults.get_error("read_file", &[Path::new("/other")]).is_ok());
        assert!(
            faults
                .get_error("read_file", &[Path::new("/a/b")])
                .is_err()
        );
        assert!(faults.get_error("read_file", &[Path::new("/a/b")]).is_ok());
    }

    #[test]
    fn api_key_takes_precedence_over_path_key() {
        let mut faults = Faults::default();
        faults.force_error("stat", injected("by api"));
        faults.force_error("/p", injected("by path"));

        let err = faults.get_error("stat", &[Path::new("/p")]).unwrap_err();
        assert!(matches!(err, FsError::Injected(msg) if msg == "by api"));

        // the path entry is still armed
        let err = faults.get_error("stat", &[Path::new("/p")]).unwrap_err();
        assert!(matches!(err, FsError::Injected(msg) if msg == "by path"));
    }

    #[test]
    fn hook_fires_repeatedly_and_sees_paths() {
        let mut faults = Faults::default();
        faults.set_hook(
            "remove_all",
            Box::new(|paths| {
                if paths.iter().any(|p| *p == Path::new("/protected")) {
                    return Err(FsError::Injected("protected".to_string()));
                }
                Ok(())
            }),
        );

        for _ in 0..2 {
            assert!(
                faults
                    .get_error("remove_all", &[Path::new("/protected")])
                    .is_err()
            );
        }
        assert!(faults.get_error("remove_all", &[Path::new("/tmp")]).is_ok());

        faults.clear_hook("remove_all");
        assert!(
            faults
                .get_error("remove_all", &[Path::new("/protected")])
                .is_ok()
        );
    }

    #[test]
    fn hook_error_leaves_forced_entries_armed() {
        let mut faults = Faults::default();
        faults.set_hook("stat", Box::new(|_| Err(injected("hooked"))));
        faults.force_error("stat", injected("forced"));

        let err = faults.get_error("stat", &[Path::new("/x")]).unwrap_err();
        assert!(matches!(err, FsError::Injected(msg) if msg == "hooked"));

        faults.clear_hook("stat");
        let err = faults.get_error("stat", &[Path::new("/x")]).unwrap_err();
        assert!(matches!(err, FsError::Injected(msg) if msg == "forced"));
    }
}
