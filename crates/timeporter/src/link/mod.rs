//! Cross-service entity linking.
//!
//! Linking decides which source and target records describe the same
//! real-world entity. Matched pairs receive each other's id in `linked_id`
//! and drop out of the transfer set; unmatched source records stay included
//! and are created in the target by the transfer step.
//!
//! Most groups match on a single field ([`link_records`]); time entries get
//! a bespoke matcher with timestamp tolerance ([`link_time_entries`]).

mod matcher;
mod table;
mod time_entry;

pub use matcher::link_records;
pub use table::LinkTable;
pub use time_entry::link_time_entries;
