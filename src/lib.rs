//! A lightweight set of test doubles for file and environment I/O.
//! Lets code under test exercise filesystem and environment-variable logic
//! without touching the real operating system.
//!
//! ### Overview
//!
//! `testio-kit` defines the [`FileIo`] and [`EnvIo`] traits and provides two
//! implementations of each: a pass-through adapter over the host OS
//! ([`OsFs`], [`OsEnv`]) and an in-memory double ([`MemFs`], [`MemEnv`]).
//! Production code takes the trait as an injected capability; tests swap in
//! the in-memory implementation and get a fully simulated hierarchical
//! filesystem with fault injection on every operation.
//!
//! **Key ideas**:
//! - **Abstraction**: One operation surface for the real OS and the double,
//!   so redirecting I/O needs no change to the code under test.
//! - **Determinism**: The in-memory store iterates in sorted path order;
//!   listing and walk output is stable across runs.
//! - **Fault injection**: One-shot forced errors and persistent validation
//!   hooks simulate OS-level failures (disk full, permission denied) that
//!   are hard to produce for real.
//! - **Isolation**: A `MemFs`/`MemEnv` is constructed per test and simply
//!   dropped at the end; nothing persists and nothing leaks to the host.

mod check;
mod core;
mod env;
mod fs;
mod text;

pub use check::{expect_file_exists, expect_file_json, expect_file_json_part, json_contains};
pub use core::{FileIo, FsError, Result, WalkControl};
pub use env::{EnvError, EnvIo, MemEnv, OsEnv};
pub use fs::{FaultHook, FileInfo, MemFs, OsFs};
pub use text::{nice_json, nice_yaml};
