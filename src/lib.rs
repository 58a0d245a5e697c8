//! prstack - stacked pull requests on GitHub
//!
//! Reconstructs the dependency forest of open PRs (a PR's source branch may
//! be another PR's destination), renders it, propagates merges down each
//! stack, and splices new PRs underneath existing ones.
//!
//! The engines in [`stack`] are written against the capability traits in
//! [`model`]; [`repo`] and [`platform`] provide the git and GitHub backed
//! implementations.

pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod platform;
pub mod progress;
pub mod repo;
pub mod stack;
pub mod types;
