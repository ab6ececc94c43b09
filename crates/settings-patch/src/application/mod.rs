//! Application layer: use cases that drive a patch run.
//!
//! - [`orchestrator`] performs the per-file operations (patch, replace,
//!   delete) through the [`orchestrator::FileStore`] port.
//! - [`run_plan`] walks a mode's plan and collects the run report.
//!
//! Nothing here touches the disk directly; the infrastructure layer supplies
//! the store and the path resolver.

pub mod orchestrator;
pub mod run_plan;
