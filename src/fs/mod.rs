mod entry;
mod faults;
mod mem_fs;
mod os_fs;

pub use entry::FileInfo;
pub use faults::FaultHook;
pub use mem_fs::MemFs;
pub use os_fs::OsFs;
