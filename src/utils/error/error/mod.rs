//! Error handling for the Gateway
//!
//! This module defines the error types shared by the engine and the HTTP layer.

mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{ErrorKind, GatewayError, Result};
