//! Client-side toggle state for buzzify.
//!
//! Follow, like and save buttons render from a [`ToggleView`] held in a
//! [`CacheStore`]. Pressing one goes through [`ToggleController::trigger`],
//! which runs the optimistic protocol:
//!
//! 1. cancel any refetch in flight for the key and snapshot the cached view
//! 2. write the flipped view so the button updates immediately
//! 3. dispatch the server action in the background, then commit the
//!    server's answer or roll back to the snapshot and notify the user
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use buzzify_client::{
//!     CacheStore, ChannelNotifier, ClientConfig, HttpServerActions, ToggleController,
//! };
//! use buzzify_common::RelationKind;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load()?;
//! let actions = Arc::new(HttpServerActions::new(&config)?);
//! let (notifier, mut toasts) = ChannelNotifier::new();
//! let store = CacheStore::new(config.cache_ttl());
//!
//! let controller = ToggleController::new(actions, store, Arc::new(notifier))
//!     .with_subject("01hx0000000000000000000000");
//! let pending = controller.trigger(RelationKind::Like, "01hx0000000000000000000001")?;
//! if pending.await?.is_err() {
//!     if let Some(toast) = toasts.recv().await {
//!         eprintln!("{}", toast.message);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod mutation;
pub mod notify;

pub use actions::{HttpServerActions, ServerActions};
pub use cache::{CacheKey, CacheStore, ToggleView, ViewKind};
pub use config::ClientConfig;
pub use controller::ToggleController;
pub use error::ActionError;
pub use mutation::{MutationTicket, OptimisticMutation};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier};
