//! Shared types for the Azure DevOps PAT provisioner workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
