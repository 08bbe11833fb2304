//! HTTP surface: request extraction, error mapping, handlers, and the server loop.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorResponse, ValidatedJson};
pub use routes::build_router;
pub use state::AppState;
