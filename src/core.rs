use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use crate::fs::FileInfo;

/// Errors surfaced by every [`FileIo`] implementation.
///
/// Callers are expected to match on the variant: the structural errors
/// (`NotFound`, `AlreadyExists`, `InvalidPath`) enforce the store invariants,
/// while `Injected` carries a caller-supplied fault planted through the
/// fault-injection surface of `MemFs`.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{}: no such file or directory", .0.display())]
    NotFound(PathBuf),
    #[error("{}: file exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("{0}")]
    Injected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FsError {
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::NotFound(_) => true,
            FsError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        match self {
            FsError::AlreadyExists(_) => true,
            FsError::Io(e) => e.kind() == std::io::ErrorKind::AlreadyExists,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;

/// Signal returned by a [`FileIo::walk`] visitor.
///
/// `SkipSubtree` on a directory prevents descent into it; on a file it is
/// equivalent to `Continue`. Aborting the whole walk is done by returning an
/// error from the visitor instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    SkipSubtree,
}

/// Filesystem operation surface shared by the real adapter ([`OsFs`]) and the
/// in-memory double ([`MemFs`]).
///
/// Production code takes this trait as an injected capability, so tests can
/// redirect all file I/O to a `MemFs` without touching the host filesystem.
/// All paths must be absolute; hierarchy semantics are documented per method
/// on the implementations.
///
/// [`OsFs`]: crate::OsFs
/// [`MemFs`]: crate::MemFs
pub trait FileIo {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
    fn write_file(&mut self, path: &Path, data: &[u8], mode: u32) -> Result<()>;
    fn stat(&self, path: &Path) -> Result<FileInfo>;
    fn mkdir_all(&mut self, path: &Path, mode: u32) -> Result<()>;
    fn is_empty_dir(&self, path: &Path) -> bool;
    fn remove_all(&mut self, path: &Path) -> Result<()>;
    fn is_directory(&self, path: &Path) -> Result<bool>;
    fn copy_file(&mut self, src: &Path, dest: &Path) -> Result<u64>;
    fn read_dir(&self, path: &Path) -> Result<Vec<FileInfo>>;
    fn file_exists(&self, path: &Path) -> Result<bool>;
    fn chtimes(&mut self, path: &Path, mtime: SystemTime) -> Result<()>;
    fn walk(
        &self,
        root: &Path,
        visitor: &mut dyn FnMut(&Path, &FileInfo) -> Result<WalkControl>,
    ) -> Result<()>;
}
