//! HTTP API module.
//!
//! Routing, handlers, error mapping and the live log stream of the movies service.

pub mod error;
pub mod handlers;
pub mod logs;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
