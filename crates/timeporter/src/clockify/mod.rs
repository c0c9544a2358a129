//! Clockify integration: client, wire types and canonical-record adapters.

pub mod client;
pub mod convert;
pub mod error;
pub mod types;

pub use client::ClockifyClient;
pub use error::ClockifyError;
