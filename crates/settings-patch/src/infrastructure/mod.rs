//! Infrastructure layer: adapters between the application and the file system.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `settings_patch_core`, but MUST NOT be imported by the `application` or
//! domain layers outside of tests.

pub mod storage;
