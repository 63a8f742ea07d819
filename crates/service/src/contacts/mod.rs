//! Contact list persisted as one JSON array file.
//!
//! Records are free-form apart from the generated `id`.

pub mod domain;
pub mod service;

pub use domain::Contact;
pub use service::ContactsService;
