//! Toggle relation vocabulary shared by the server and the client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of many-to-many edge a toggle action flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// `Follows(follower_id, following_id)`
    Follow,
    /// `Like(user_id, post_id)`
    Like,
    /// `Saved(user_id, post_id)`
    Save,
}

impl RelationKind {
    /// Stable lowercase name, used in logs and routes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Like => "like",
            Self::Save => "save",
        }
    }

    /// Whether the target of this relation is a user (as opposed to a post).
    #[must_use]
    pub const fn targets_user(self) -> bool {
        matches!(self, Self::Follow)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a toggle relation: the edge exists (`On`) or it does not (`Off`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    /// The edge exists.
    On,
    /// The edge does not exist.
    Off,
}

impl ToggleState {
    /// Map row existence to a state.
    #[must_use]
    pub const fn from_exists(exists: bool) -> Self {
        if exists { Self::On } else { Self::Off }
    }

    /// Whether the edge exists.
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// The opposite state.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}
