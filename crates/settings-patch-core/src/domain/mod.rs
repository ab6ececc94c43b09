//! Domain layer: pure text transformations with no file-system access.
//!
//! - **`rules`**    – the typed [`rules::EditRule`] variants and their outcomes.
//! - **`editor`**   – applies a rule list to a document, in order.
//! - **`settings`** – lossless structured view of a settings module, used to
//!   audit patched documents for duplicate declarations.

pub mod editor;
pub mod rules;
pub mod settings;
