//! # Merit - Performance Appraisal Server
//!
//! Library surface of the merit application. The binary in `main.rs`
//! drives the same modules; this crate exists so integration tests can
//! build the router and types without spawning the binary.
//!
//! - [`api`] - HTTP REST API (axum router, handlers, request/response types)
//! - [`cli`] - CLI interface (clap commands over the same service)
//! - [`directory`] - TOML employee roster loading
//! - [`sink`] - wall clock and tracing event sink wiring

pub mod api;
pub mod cli;
pub mod directory;
pub mod sink;
