//! Webstats analytics client.
//!
//! Webstats exposes a GraphQL API. The reporter stores one Lighthouse
//! statistic per commit and reads back the statistic of the base commit.

pub mod client;

pub use client::{BaseReport, WebstatsClient, WebstatsConfig};
