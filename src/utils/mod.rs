//! Shared helpers: file reading, fingerprints, paths, token estimates, retries.

pub mod encoding;
pub mod hashing;
pub mod paths;
pub mod retry;
pub mod tokens;

pub use encoding::read_source;
pub use hashing::content_fingerprint;
pub use paths::{artifact_path, normalize_path, relative_to_root, resolve_source};
pub use retry::retry_once;
pub use tokens::estimate_tokens;
