//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod follows;
pub mod like;
pub mod post;
pub mod saved;
pub mod user;

pub use comment::Entity as Comment;
pub use follows::Entity as Follows;
pub use like::Entity as Like;
pub use post::Entity as Post;
pub use saved::Entity as Saved;
pub use user::Entity as User;
