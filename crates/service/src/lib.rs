//! Service layer for the contacts/accounts backend.
//! - Contacts: JSON-file backed list with whole-file read-modify-write.
//! - Auth: signup, login, session tokens, email verification.
//! - Avatars and outgoing mail as separate, swappable pieces.

pub mod errors;
pub mod auth;
pub mod avatar;
pub mod contacts;
pub mod mail;
pub mod runtime;
pub mod storage;
