//! Azure DevOps PAT lifecycle client
//!
//! Creates and revokes Personal Access Tokens through the PAT management
//! REST API, given a bearer token acquired elsewhere. Responses are decoded
//! regardless of status so server-provided failure messages survive into
//! the returned error.
//!
//! The issued PAT value is write-once: the API has no read-back, so the
//! caller's persisted state is the only place it ever exists after creation.

mod error;
mod pat;

pub use error::{Error, Result};
pub use pat::{PAT_API_VERSION, PatRecord, create_pat, delete_pat};
