//! Shared plumbing for the contacts/accounts backend: logging setup,
//! runtime directory checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;
