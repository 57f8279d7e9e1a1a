//! Server Module
//!
//! The daemon's request loop: a ZeroMQ REP socket receiving command lines,
//! a registry that parses them, and the commands that run them against the
//! layout service.

/// Command registry module - command names, argument counts and parsing
pub mod command_registry;

/// Commands module - registers every command and executes parsed ones
pub mod commands;

/// Reply formatting
pub mod response_handler;

/// Server module - implements the ZeroMQ communication layer and message handling
pub mod server;
