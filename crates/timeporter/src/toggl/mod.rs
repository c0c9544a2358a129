//! Toggl integration: client, wire types and canonical-record adapters.

pub mod client;
pub mod convert;
pub mod error;
pub mod types;

pub use client::TogglClient;
pub use error::TogglError;
