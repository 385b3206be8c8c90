//! Pass-through [`FileIo`] adapter over the host filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::{FileIo, FsError, Result, WalkControl};
use crate::fs::FileInfo;

/// [`FileIo`] implementation backed by the host OS.
///
/// Stateless and free to construct. Inject a value wherever file I/O happens
/// so that tests can substitute a [`MemFs`](crate::MemFs); there is no hidden
/// global instance. `io::Error`s with `NotFound`/`AlreadyExists` kinds are
/// mapped onto the structural error variants so both implementations are
/// contract-compatible.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl OsFs {
    pub fn new() -> Self {
        OsFs
    }
}

fn io_err(path: &Path, err: io::Error) -> FsError {
    match err.kind() {
        io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
        io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path.to_path_buf()),
        _ => FsError::Io(err),
    }
}

fn info_from(path: &Path, meta: &fs::Metadata) -> FileInfo {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => "/".to_string(),
    };
    #[cfg(unix)]
    let mode = {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode()
    };
    #[cfg(not(unix))]
    let mode = 0;
    let size = if meta.is_dir() { 0 } else { meta.len() };
    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    FileInfo::new(name, size, mode, modified, meta.is_dir())
}

fn walk_into(
    path: &Path,
    visitor: &mut dyn FnMut(&Path, &FileInfo) -> Result<WalkControl>,
) -> Result<()> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_err(path, e)),
    };

    if visitor(path, &info_from(path, &meta))? == WalkControl::SkipSubtree {
        return Ok(());
    }
    if !meta.is_dir() {
        return Ok(());
    }

    let mut children: Vec<PathBuf> = fs::read_dir(path)
        .map_err(|e| io_err(path, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()
        .map_err(|e| io_err(path, e))?;
    children.sort();

    for child in children {
        let meta = fs::metadata(&child).map_err(|e| io_err(&child, e))?;
        if meta.is_dir() {
            walk_into(&child, visitor)?;
        } else {
            visitor(&child, &info_from(&child, &meta))?;
        }
    }
    Ok(())
}

impl FileIo for OsFs {
    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| io_err(path, e))
    }

    fn write_file(&mut self, path: &Path, data: &[u8], mode: u32) -> Result<()> {
        fs::write(path, data).map_err(|e| io_err(path, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(mode))
                .map_err(|e| io_err(path, e))?;
        }
        #[cfg(not(unix))]
        let _ = mode;
        Ok(())
    }

    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let meta = fs::metadata(path).map_err(|e| io_err(path, e))?;
        Ok(info_from(path, &meta))
    }

    fn mkdir_all(&mut self, path: &Path, mode: u32) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(path).map_err(|e| io_err(path, e))
    }

    fn is_empty_dir(&self, path: &Path) -> bool {
        match fs::read_dir(path) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => false,
        }
    }

    fn remove_all(&mut self, path: &Path) -> Result<()> {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_err(path, e)),
        };
        if meta.is_dir() {
            fs::remove_dir_all(path).map_err(|e| io_err(path, e))
        } else {
            fs::remove_file(path).map_err(|e| io_err(path, e))
        }
    }

    fn is_directory(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err(path, e)),
        }
    }

    fn copy_file(&mut self, src: &Path, dest: &Path) -> Result<u64> {
        fs::copy(src, dest).map_err(|e| io_err(src, e))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<FileInfo>> {
        let mut entries: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|e| io_err(path, e))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<_>>()
            .map_err(|e| io_err(path, e))?;
        entries.sort();

        let mut infos = Vec::with_capacity(entries.len());
        for entry in entries {
            let meta = fs::metadata(&entry).map_err(|e| io_err(&entry, e))?;
            infos.push(info_from(&entry, &meta));
        }
        Ok(infos)
    }

    fn file_exists(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err(path, e)),
        }
    }

    fn chtimes(&mut self, path: &Path, mtime: SystemTime) -> Result<()> {
        let file = fs::File::options()
            .write(true)
            .open(path)
            .map_err(|e| io_err(path, e))?;
        file.set_modified(mtime).map_err(|e| io_err(path, e))
    }

    fn walk(
        &self,
        root: &Path,
        visitor: &mut dyn FnMut(&Path, &FileInfo) -> Result<WalkControl>,
    ) -> Result<()> {
        walk_into(root, visitor)
    }
}
