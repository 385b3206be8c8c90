//! In-memory filesystem double backed by a flat path map.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::{FileIo, FsError, Result, WalkControl};
use crate::fs::entry::Node;
use crate::fs::faults::{FaultHook, Faults};
use crate::fs::FileInfo;

/// An in-memory [`FileIo`] implementation for tests.
///
/// `MemFs` keeps every entry in a flat map keyed by absolute, normalized
/// path; the hierarchy is implicit in the keys (an entry is inside a
/// directory iff its path extends the directory's path by one or more
/// components). This keeps recursive removal a plain prefix scan and avoids
/// any parent/child bookkeeping, at the cost of O(n) scans for directory
/// operations, which is fine at test-fixture scale.
///
/// ### Internal state
///
/// * `nodes` — the path map. `BTreeMap` gives sorted, deterministic
///   iteration, so listing and walk order is stable across runs.
/// * `faults` — the fault-injection state, consulted by every operation
///   before the map is touched. Kept in a `RefCell` because one-shot forced
///   errors are consumed even by read-only operations.
///
/// ### Invariants
///
/// 1. An entry may be created only if its parent directory entry exists
///    (`mkdir_all` synthesizes missing ancestors).
/// 2. Each path maps to exactly one node, and a node never changes between
///    file and directory; conflicting creations fail.
/// 3. Removing a directory removes its whole subtree.
/// 4. All paths are absolute. Nothing is pre-seeded, not even `/`; create it
///    with `mkdir_all` like any other directory.
///
/// ### Lifecycle
///
/// Construct one per test (or fixture), populate it through its own write
/// operations and drop it at test end. There is no teardown and no
/// persistence. Not thread-safe; a single logical owner mutates it at a time.
///
/// ### Example
///
/// ```
/// use std::path::Path;
/// use testio_kit::{FileIo, MemFs};
///
/// let mut fs = MemFs::new();
/// fs.mkdir_all(Path::new("/docs"), 0o755).unwrap();
/// fs.write_file(Path::new("/docs/note.txt"), b"Hello", 0o644).unwrap();
///
/// assert_eq!(fs.read_file(Path::new("/docs/note.txt")).unwrap(), b"Hello");
/// ```
#[derive(Default)]
pub struct MemFs {
    nodes: BTreeMap<PathBuf, Node>,
    faults: RefCell<Faults>,
}

/// Normalizes separators and strips trailing slashes. `.`/`..` segments are
/// not resolved; callers must pass clean paths.
fn clean(path: &Path) -> PathBuf {
    path.components().collect()
}

fn base_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => "/".to_string(),
    }
}

impl MemFs {
    /// Creates an empty store. No root entry exists until one is made.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot error for `key`, which is either an operation name
    /// (e.g. `"write_file"`) or a path. The first matching operation fails
    /// with `err`; the entry is consumed and subsequent calls succeed.
    pub fn force_error(&self, key: impl Into<String>, err: FsError) {
        self.faults.borrow_mut().force_error(key, err);
    }

    /// Installs a persistent validator for the named operation. The hook is
    /// invoked with the call's path arguments on every call until cleared;
    /// returning an error aborts the operation.
    pub fn set_hook(&self, api: impl Into<String>, hook: FaultHook) {
        self.faults.borrow_mut().set_hook(api, hook);
    }

    pub fn clear_hook(&self, api: &str) {
        self.faults.borrow_mut().clear_hook(api);
    }

    /// Prints every stored path in sorted order, with the byte size for
    /// files and a directory marker for directories.
    pub fn dump(&self) {
        print!("{self}");
    }

    fn inject(&self, api: &str, paths: &[&Path]) -> Result<()> {
        self.faults.borrow_mut().get_error(api, paths)
    }
}

impl fmt::Display for MemFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, node) in &self.nodes {
            if node.is_dir() {
                writeln!(f, "{} (dir)", path.display())?;
            } else {
                writeln!(f, "{} - {} bytes", path.display(), node.data().len())?;
            }
        }
        Ok(())
    }
}

impl FileIo for MemFs {
    /// Returns the content bytes of a file. Fails with `NotFound` if `path`
    /// is absent or names a directory.
    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.inject("read_file", &[path])?;

        let inner = clean(path);
        match self.nodes.get(&inner) {
            Some(node) if !node.is_dir() => Ok(node.data().to_vec()),
            _ => Err(FsError::NotFound(inner)),
        }
    }

    /// Creates or overwrites a file node with the given content and mode.
    ///
    /// The parent directory entry must already exist; `NotFound` otherwise.
    /// Fails with `AlreadyExists` if `path` names an existing directory.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not absolute. The store only simulates absolute
    /// trees and a relative path means the test fixture itself is broken.
    fn write_file(&mut self, path: &Path, data: &[u8], mode: u32) -> Result<()> {
        self.inject("write_file", &[path])?;

        if !path.is_absolute() {
            panic!("relative path is not mocked: {}", path.display());
        }
        let inner = clean(path);

        let parent = inner.parent().unwrap_or(Path::new("/"));
        match self.nodes.get(parent) {
            Some(node) if node.is_dir() => {}
            _ => return Err(FsError::NotFound(parent.to_path_buf())),
        }

        if let Some(existing) = self.nodes.get(&inner) {
            if existing.is_dir() {
                return Err(FsError::AlreadyExists(inner));
            }
        }

        let node = Node::file(&base_name(&inner), data, mode);
        self.nodes.insert(inner, node);
        Ok(())
    }

    fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inject("stat", &[path])?;

        let inner = clean(path);
        match self.nodes.get(&inner) {
            Some(node) => Ok(node.info().clone()),
            None => Err(FsError::NotFound(inner)),
        }
    }

    /// Creates `path` and every missing ancestor as directories. Idempotent:
    /// succeeds without change if `path` already is a directory; fails with
    /// `AlreadyExists` if it is a file. Recursion stops at the root marker,
    /// which is not created implicitly.
    fn mkdir_all(&mut self, path: &Path, mode: u32) -> Result<()> {
        self.inject("mkdir_all", &[path])?;

        if !path.is_absolute() {
            return Err(FsError::InvalidPath(format!(
                "{}: not absolute",
                path.display()
            )));
        }
        let inner = clean(path);

        if let Some(existing) = self.nodes.get(&inner) {
            if !existing.is_dir() {
                return Err(FsError::AlreadyExists(inner));
            }
            return Ok(());
        }

        if let Some(parent) = inner.parent() {
            if parent != Path::new("/") {
                self.mkdir_all(parent, mode)?;
            }
        }

        let node = Node::dir(&base_name(&inner), mode);
        self.nodes.insert(inner, node);
        Ok(())
    }

    /// True only if `path` is a directory with no entries below it. A
    /// missing path or a file yields `false`, never an error. Exempt from
    /// fault injection.
    fn is_empty_dir(&self, path: &Path) -> bool {
        let inner = clean(path);
        match self.nodes.get(&inner) {
            Some(node) if node.is_dir() => !self
                .nodes
                .keys()
                .any(|k| k != &inner && k.starts_with(&inner)),
            _ => false,
        }
    }

    /// Deletes `path` and its whole subtree. Succeeds even when nothing
    /// matched.
    fn remove_all(&mut self, path: &Path) -> Result<()> {
        self.inject("remove_all", &[path])?;

        let inner = clean(path);
        let doomed: Vec<PathBuf> = self
            .nodes
            .keys()
            .filter(|k| k.starts_with(&inner))
            .cloned()
            .collect();
        for p in doomed {
            self.nodes.remove(&p);
        }
        Ok(())
    }

    /// Returns the directory flag for `path`. A missing path yields
    /// `Ok(false)`; any other `stat` error propagates.
    fn is_directory(&self, path: &Path) -> Result<bool> {
        self.inject("is_directory", &[path])?;

        match self.stat(path) {
            Ok(info) => Ok(info.is_dir()),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Deep-copies the file at `src` to `dest`, preserving content, mode and
    /// modification time but taking `dest`'s base name. Returns the number
    /// of bytes copied.
    fn copy_file(&mut self, src: &Path, dest: &Path) -> Result<u64> {
        self.inject("copy_file", &[src, dest])?;

        let src = clean(src);
        let dest = clean(dest);

        let src_node = match self.nodes.get(&src) {
            Some(node) if !node.is_dir() => node,
            _ => return Err(FsError::NotFound(src)),
        };

        let parent = dest.parent().unwrap_or(Path::new("/"));
        match self.nodes.get(parent) {
            Some(node) if node.is_dir() => {}
            _ => return Err(FsError::NotFound(parent.to_path_buf())),
        }
        if let Some(existing) = self.nodes.get(&dest) {
            if existing.is_dir() {
                return Err(FsError::AlreadyExists(dest));
            }
        }

        let copy = src_node.copy_as(&base_name(&dest));
        let size = copy.info().size();
        self.nodes.insert(dest, copy);
        Ok(size)
    }

    /// Lists the immediate children of `path` in sorted order. A missing or
    /// non-directory path yields an empty list, not an error.
    fn read_dir(&self, path: &Path) -> Result<Vec<FileInfo>> {
        self.inject("read_dir", &[path])?;

        let inner = clean(path);
        Ok(self
            .nodes
            .iter()
            .filter(|(k, _)| k.parent() == Some(inner.as_path()))
            .map(|(_, node)| node.info().clone())
            .collect())
    }

    /// True only if `path` exists and is a file; directories are not
    /// "existing files".
    fn file_exists(&self, path: &Path) -> Result<bool> {
        self.inject("file_exists", &[path])?;

        let inner = clean(path);
        Ok(matches!(self.nodes.get(&inner), Some(node) if !node.is_dir()))
    }

    /// Replaces the modification time of an existing entry, preserving every
    /// other field.
    fn chtimes(&mut self, path: &Path, mtime: SystemTime) -> Result<()> {
        self.inject("chtimes", &[path])?;

        let inner = clean(path);
        match self.nodes.get_mut(&inner) {
            Some(node) => {
                node.info_mut().set_modified(mtime);
                Ok(())
            }
            None => Err(FsError::NotFound(inner)),
        }
    }

    /// Depth-first pre-order traversal starting at `root`.
    ///
    /// A missing root is a silent no-op. The root is visited first;
    /// `SkipSubtree` from its visit ends the walk successfully. Siblings are
    /// visited in sorted order; fault injection re-runs under `"walk"` for
    /// every child path, and any visitor error aborts the whole walk.
    fn walk(
        &self,
        root: &Path,
        visitor: &mut dyn FnMut(&Path, &FileInfo) -> Result<WalkControl>,
    ) -> Result<()> {
        self.inject("walk", &[root])?;

        let inner = clean(root);
        let Some(node) = self.nodes.get(&inner) else {
            return Ok(());
        };
        if visitor(&inner, node.info())? == WalkControl::SkipSubtree {
            return Ok(());
        }

        let children: Vec<(PathBuf, FileInfo)> = self
            .nodes
            .iter()
            .filter(|(k, _)| k.parent() == Some(inner.as_path()))
            .map(|(k, node)| (k.clone(), node.info().clone()))
            .collect();

        for (child, info) in children {
            self.inject("walk", &[&child])?;
            if info.is_dir() {
                self.walk(&child, visitor)?;
            } else {
                // SkipSubtree on a file just moves on to the next sibling.
                visitor(&child, &info)?;
            }
        }
        Ok(())
    }
}
