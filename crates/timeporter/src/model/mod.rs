//! Canonical data model shared by both services.
//!
//! Raw API payloads from Toggl and Clockify are converted into a single
//! canonical record shape per entity group ([`EntityRecord`]) as soon as they
//! are fetched. Everything downstream (linking, transfer, reporting) works
//! exclusively on canonical records and never branches on which service a
//! payload came from.

mod group;
mod record;

pub use group::{EntityGroup, Mapping, TRANSFER_ORDER};
pub use record::EntityRecord;
