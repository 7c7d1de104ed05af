//! reelsync - keeps a media catalog in sync with a file server
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod fileserver;
pub mod integrations;
pub mod server;
pub mod sync;
