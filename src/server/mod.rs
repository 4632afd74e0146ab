pub mod config;
mod error;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
#[allow(unused_imports)] // Used by main.rs
pub use server::run_server;
