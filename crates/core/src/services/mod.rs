//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod following;
pub mod identity;
pub mod like;
pub mod pagination;
pub mod post;
pub mod revalidate;
pub mod saved;
pub mod user;

pub use comment::{CommentService, CommentView, CreateCommentInput};
pub use following::{FollowCounts, FollowOutcome, FollowingService};
pub use identity::{
    ExternalIdentity, IdentityProvider, IdentityProviderService, JwtIdentityProvider,
};
pub use like::{LikeInfo, LikeService};
pub use pagination::{Page, PageRequest};
pub use post::{CreatePostInput, MAX_DESCRIPTION_LENGTH, PostService, PostView};
pub use revalidate::{
    BroadcastRevalidator, NoOpRevalidator, RevalidationHint, Revalidator, RevalidatorService,
};
pub use saved::{SaveOutcome, SavedService};
pub use user::{Profile, UpdateProfileInput, UserService, UserSummary};
