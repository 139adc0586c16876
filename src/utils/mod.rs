//! # Utility Functions
//!
//! General helpers used throughout the crate.
//!
//! ## Submodules
//!
//! - **digest**: SHA-256 digests of buffers and cached files, logged alongside uploads.
//! - **http**: Shared `reqwest` client construction and URL helpers.
//! - **test_server**: A local HTTP stub for client tests (test builds only).

mod digest;
mod http;
#[cfg(test)]
pub(crate) mod test_server;

pub use digest::{compute_digest, digest_file};
pub use http::{build_client, join_path, normalize_url};
