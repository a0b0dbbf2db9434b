//! Client-side core for the clinic administrative system.
//!
//! Pure logic only: input masking for Brazilian phone numbers, CPFs and
//! postal codes, list query composition (offsets, cache keys, request
//! parameters), the backend's response envelopes, and the explicit query
//! cache used by the data-fetching layer. No I/O happens in this crate.

pub mod cache;
pub mod envelope;
pub mod error;
pub mod masking;
pub mod pagination;
pub mod query;
pub mod resources;
pub mod types;
pub mod validation;
