pub mod account;
pub mod campaign;
pub mod config;
pub mod error;
pub mod money;
pub mod revenue;
pub mod rule;
pub mod utm;

pub use config::AppConfig;
pub use error::{PilotError, PilotResult};
