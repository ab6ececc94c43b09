//! settings-patch library entry point.
//!
//! Exposes the application and infrastructure layers so that integration
//! tests in `tests/` and the binary entry point in `main.rs` share the same
//! module tree.

pub mod application;
pub mod infrastructure;
