//! Declarative lifecycle orchestration for a managed Azure DevOps PAT
//!
//! Sequences the credential acquirer and the PAT API client in response to
//! lifecycle requests: create, delete, pass-through update, and import.
//! Each operation is synchronous and independent per managed resource; a
//! fresh token is acquired for every operation and discarded afterwards.
//!
//! Concurrency contract: the toggle workaround mutates shared external
//! state (the app registration's client-type flag), so two concurrent
//! operations against the same client id can race. This crate provides no
//! locking — callers serialize operations per app registration.

mod error;
mod resource;
mod spec;

pub use error::{Error, Result};
pub use resource::PatResource;
pub use spec::{PatSpec, PatState};
