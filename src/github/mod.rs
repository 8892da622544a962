//! GitHub REST API access.
//!
//! Covers the handful of endpoints the reporter needs: repository and
//! branch lookup, and pull request comments.

pub mod client;

pub use client::{CommentAction, GithubClient};
