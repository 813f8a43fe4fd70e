//! Core business logic for buzzify.
//!
//! Services sit between the HTTP layer and the repositories in `buzzify-db`.
//! Every relation toggle (follow, like, save) goes through a single
//! transactional repository call, so the state a service reports back is
//! always the state the database committed.

pub mod services;

pub use services::*;
