//! fhirplan-stack — the FHIR server stack definition.
//!
//! Composes the deployment plan in one linear pass: resolve the existing
//! network and DNS zone, provision the database cluster, provision the
//! load-balanced container service (which consumes the database outputs),
//! bind the internal DNS record, and optionally route alarm transitions
//! to a chat-ops topic.
//!
//! There is no runtime behavior here: scaling, failover and alarm
//! evaluation all happen later inside the cloud provider. This crate only
//! builds the dependency graph the provider will execute.

pub mod compute;
pub mod database;
pub mod dns;
pub mod error;
pub mod network;
pub mod notify;
pub mod stack;

pub use error::{StackError, StackResult};
pub use stack::FhirServerStack;
