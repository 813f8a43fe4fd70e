//! Common utilities and shared types for buzzify.
//!
//! This crate provides foundational components used across all buzzify crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Toggle relations**: [`RelationKind`] and [`ToggleState`], shared with the client
//!
//! # Example
//!
//! ```no_run
//! use buzzify_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID {} for {}", id, config.server.url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod relation;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use relation::{RelationKind, ToggleState};
