//! News fetching

pub mod client;

pub use client::{NewsApiClient, NewsSource};
