//! HTTP API layer for yatube.
//!
//! - **Endpoints**: posts, comments, groups, follows, accounts and tokens
//! - **Extractors**: principal resolution and list query parameters
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8. Routes are relative; the server nests them under
//! `/api/v1`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
