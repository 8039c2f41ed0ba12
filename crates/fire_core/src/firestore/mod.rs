//! Firestore REST adapter
//!
//! - [`path`]: collection path parsing
//! - [`wire`]: request bodies and response decoding
//! - [`auth`]: service account and emulator tokens
//! - [`client`]: the [`DocumentStore`](crate::DocumentStore) implementation

pub mod auth;
pub mod client;
pub mod path;
pub mod wire;

pub use auth::Authenticator;
pub use client::{ClientOptions, FirestoreClient};
pub use path::CollectionPath;
