//! Newswall - an RSS/Atom news aggregator
//!
//! Fetches feeds, merges and filters their items into an in-memory
//! snapshot, and serves the result as a CLI report, a JSON API, or an
//! auto-refreshing HTML signage page.

pub mod aggregate;
pub mod config;
pub mod feed;
pub mod fetch;
pub mod report;
pub mod server;
pub mod state;
