//! Data-fetching layer for the clinic administrative front-end.
//!
//! Sits between list views / admin screens and the remote backend: builds
//! requests from [`clinica_core`] queries, unwraps the backend envelopes,
//! serves list pages from an explicit query cache, and invalidates cached
//! pages after mutations (divergence audits, carteirinha migrations).

pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod source;
