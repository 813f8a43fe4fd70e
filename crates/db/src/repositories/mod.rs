//! Database repositories.

mod comment;
mod follows;
mod like;
mod post;
mod relation;
mod saved;
mod user;

pub use comment::CommentRepository;
pub use follows::FollowsRepository;
pub use like::LikeRepository;
pub use post::PostRepository;
pub use relation::{RelationEdge, ToggleRelationRepository};
pub use saved::SavedRepository;
pub use user::UserRepository;
