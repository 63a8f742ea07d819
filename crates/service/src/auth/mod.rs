//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Signup, login, session tokens and email verification live here,
//! independent of the web framework.

pub mod domain;
pub mod errors;
pub mod gravatar;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;

pub use errors::AuthError;
pub use service::AuthService;
