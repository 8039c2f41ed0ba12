//! Shared test utilities for firebrowse test suites
//!
//! # Modules
//!
//! - [`workspace`]: temporary directories holding credential and config files
//! - [`cli`]: command builders with a clean environment
//! - [`emulator`]: a wiremock stand-in for the Firestore emulator
//! - [`assertions`]: predicates over the browse report
//!
//! # Example
//!
//! ```rust
//! use fire_test_helpers::prelude::*;
//!
//! fn my_test() {
//!     let workspace = workspace_with_credentials("demo-project");
//!
//!     browse_command()
//!         .current_dir(workspace.path())
//!         .env("GOOGLE_APPLICATION_CREDENTIALS", credentials_path(&workspace))
//!         .arg("--help")
//!         .assert()
//!         .success();
//! }
//! ```

pub mod assertions;
pub mod cli;
pub mod emulator;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::cli::{browse_command, BIN_NAME};
    pub use crate::emulator::{
        count_response, document_json, error_response, run_query_response, FirestoreEmulator,
    };
    pub use crate::workspace::{
        credentials_path, temp_dir, workspace_with_config, workspace_with_credentials,
    };
}
