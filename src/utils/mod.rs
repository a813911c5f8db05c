//! Utility modules for Art Fetch
//!
//! - `files`: output directory layout and bootstrapping
//! - `http`: HTTP client utilities

pub mod files;
pub mod http;
