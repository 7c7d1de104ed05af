//! Database query operations.
//!
//! - `documents` - Movie and show documents, update-intent application
//! - `sync_info` - Last sync time and summary

pub mod documents;
pub mod sync_info;
