//! Persistence models for user accounts.

pub mod errors;
pub mod db;
pub mod user;
