use std::time::SystemTime;

/// Metadata describing one filesystem entry, as returned by `stat`,
/// `read_dir` and the walk visitor.
///
/// `size` is the byte length of the content for files and 0 for directories.
/// `mode` is an opaque permission value; neither implementation enforces it.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    name: String,
    size: u64,
    mode: u32,
    modified: SystemTime,
    is_dir: bool,
}

impl FileInfo {
    pub(crate) fn new(
        name: impl Into<String>,
        size: u64,
        mode: u32,
        modified: SystemTime,
        is_dir: bool,
    ) -> FileInfo {
        FileInfo {
            name: name.into(),
            size,
            mode,
            modified,
            is_dir,
        }
    }

    /// Base name of the entry, not the full path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    pub(crate) fn set_modified(&mut self, mtime: SystemTime) {
        self.modified = mtime;
    }
}

/// One entry of the in-memory store: content plus metadata.
///
/// The directory flag is fixed at construction; a path is never converted
/// between file and directory, conflicting creations fail instead.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    data: Vec<u8>,
    info: FileInfo,
}

impl Node {
    pub(crate) fn file(name: &str, data: &[u8], mode: u32) -> Node {
        Node {
            data: data.to_vec(),
            info: FileInfo::new(name, data.len() as u64, mode, SystemTime::now(), false),
        }
    }

    pub(crate) fn dir(name: &str, mode: u32) -> Node {
        Node {
            data: Vec::new(),
            info: FileInfo::new(name, 0, mode, SystemTime::now(), true),
        }
    }

    /// Deep copy of a file node under a new base name, preserving content,
    /// mode and modification time.
    pub(crate) fn copy_as(&self, name: &str) -> Node {
        Node {
            data: self.data.clone(),
            info: FileInfo::new(
                name,
                self.info.size(),
                self.info.mode(),
                self.info.modified(),
                false,
            ),
        }
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn info(&self) -> &FileInfo {
        &self.info
    }

    pub(crate) fn info_mut(&mut self) -> &mut FileInfo {
        &mut self.info
    }

    pub(crate) fn is_dir(&self) -> bool {
        self.info.is_dir()
    }
}
