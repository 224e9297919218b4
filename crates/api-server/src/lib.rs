//! REST surface over the reconciliation and automation engines.

pub mod handlers;
pub mod models;
pub mod router;

pub use handlers::ApiState;
pub use router::{api_router, build_state};
