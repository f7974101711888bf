//! HogQL runner - run HogQL queries against the PostHog API.
//!
//! This library exposes the core modules for use by the `hogql` binary,
//! explorer integrations and integration tests.

pub mod adapter;
pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod explorer;
pub mod logging;
pub mod query;
pub mod render;
