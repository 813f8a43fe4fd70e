//! HTTP API layer for buzzify.
//!
//! This crate exposes the server actions over HTTP:
//!
//! - **Endpoints**: JSON RPC-style `POST` routes per feature
//! - **Extractors**: Authenticated and optional callers
//! - **Middleware**: Bearer token resolution through the identity provider
//! - **Revalidation**: Server-Sent Events stream of page invalidation hints
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod sse;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
