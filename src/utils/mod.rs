//! Utility modules for the Gateway
//!
//! - **error**: Error types, classification and HTTP rendering
//! - **logging**: Subscriber setup and secret masking

pub mod error; // Error handling
pub mod logging; // Logging & monitoring
