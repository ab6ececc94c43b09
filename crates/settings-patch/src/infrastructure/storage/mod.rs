//! Storage infrastructure.
//!
//! - `config` reads the optional `settings-patch.toml` and maps logical
//!   targets to project-relative paths.
//! - `fs_store` is the real [`FileStore`](crate::application::orchestrator::FileStore),
//!   rooted at the project directory.
//! - `memory` is an in-memory store for tests and dry experiments.

pub mod config;
pub mod fs_store;
pub mod memory;
