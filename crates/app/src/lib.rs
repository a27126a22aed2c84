//! Application wiring: configuration, backend selection and the service
//! facade every presentation layer talks to.

pub mod config;
pub mod errors;
pub mod services;

pub use config::AppConfig;
pub use errors::{ErrorCode, error_body, json_error};
pub use services::{AppServices, build_services};
