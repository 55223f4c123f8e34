//! Integration tests for kart-relay.
//!
//! These tests run the real connection manager against a local mock vendor:
//! - Subscription handshake
//! - Frame dispatch into session state
//! - Close, reconnect and shutdown behavior

pub mod common;
