//! Core type definition module
//!
//! Request and response shapes shared by the engine, the provider adapters
//! and the HTTP layer.

pub mod message;
pub mod requests;
pub mod responses;

pub use message::*;
pub use requests::*;
pub use responses::*;
