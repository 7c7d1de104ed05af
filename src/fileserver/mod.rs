//! File-server access: the listing contract and the metadata fetcher.
//!
//! - [`listing`] -- Serde types for the listing and episode/season number parsing.
//! - [`client`] -- The [`FileServer`] trait and its HTTP implementation.

pub mod client;
pub mod listing;

pub use client::{FileServer, HttpFileServer};
pub use listing::{
    EpisodeListing, EpisodeUrls, Listing, MovieListing, MovieUrls, PrimaryVideo, SeasonListing,
    ShowListing,
};
