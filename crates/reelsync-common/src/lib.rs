//! Reelsync-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across reelsync:
//!
//! - **Error Handling**: Common error types and result aliases
//! - **Captions**: The ordered per-language caption map stored on movies and episodes
//! - **Timestamps**: Lenient parsing of file-server and catalog timestamps
//! - **URLs**: Joining file-server relative asset paths onto a base URL
//!
//! # Examples
//!
//! ```
//! use reelsync_common::{Error, Result};
//! use reelsync_common::urls::join_asset_url;
//!
//! assert_eq!(
//!     join_asset_url("http://files.local", "/movies/A/A.mp4"),
//!     "http://files.local/movies/A/A.mp4"
//! );
//!
//! fn example() -> Result<()> {
//!     Err(Error::malformed("`episodes` is not an array"))
//! }
//! ```

pub mod captions;
pub mod error;
pub mod timestamps;
pub mod types;
pub mod urls;

pub use captions::{CaptionMap, CaptionTrack};
pub use error::{Error, Result};
pub use types::*;
