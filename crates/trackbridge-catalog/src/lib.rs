// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP clients for the two streaming catalogs.
//!
//! The destination client wraps the search endpoint with bounded concurrency,
//! pacing, and typed throttling detection with retry/backoff, and carries the
//! playlist and favorites write operations. The source client reads the
//! user's library. All wire-shape tolerance lives in [`models`].

pub mod client;
#[cfg(test)]
mod client_tests;
pub mod error;
pub mod models;
pub mod rate_limiter;
pub mod source;

pub use client::{
    DestinationClient, DestinationClientBuilder, PlaylistWriter, RetryPolicy, TrackSearch,
};
pub use error::{CatalogError, Result};
pub use rate_limiter::RateLimiter;
pub use source::{SourceClient, SourceClientBuilder};
