//! Data models for the gateway.
//!
//! Everything here is request-scoped: built from store responses, rendered or
//! streamed, then dropped.

pub mod listing;
pub mod object;
pub mod view;
