//! Error Handling utilities
//!
//! This module provides the gateway error type, its classification and its
//! HTTP rendering.

pub mod error;

pub use error::*;
