//! Utilities Module
//!
//! Shared helpers for the daemon and the command-line client.

pub mod tracing;
