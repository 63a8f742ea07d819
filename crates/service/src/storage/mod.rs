//! Storage abstractions for service layer
//!
//! File-backed stores for data small enough to rewrite as a whole on every
//! change.

pub mod json_list_store;
