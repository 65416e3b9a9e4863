//! Integration tests for relay-gateway
//!
//! These tests run real HTTP traffic against `wiremock` upstreams.

pub mod config_tests;
pub mod dispatch_tests;
pub mod http_tests;
