//! Core engine for firebrowse
//!
//! This crate contains the document model, the display formatter, the browse
//! flow and the Firestore REST adapter.

pub mod browse;
pub mod firestore;
pub mod formatter;
pub mod model;
pub mod store;

pub use browse::{browse, BrowseOutcome};
pub use firestore::FirestoreClient;
pub use formatter::{display_value, format_document};
pub use model::{Document, Value};
pub use store::DocumentStore;
