//! cors-relay is a single-hop HTTP forwarding proxy.
//!
//! A caller sends any request to `/proxy?url=<target>`. The request is
//! re-issued to the target with its method, headers (minus `Host`,
//! `Origin` and `Referer`) and body, and the target's response is
//! streamed back with permissive CORS headers added. `OPTIONS`
//! preflights are answered locally.
//!
//! # Architecture
//!
//! - [`cli`] -- Startup flags parsed with clap derive macros.
//! - [`run`] -- Process bootstrap: logging, bind, serve, graceful shutdown.
//! - [`error`] -- Startup and per-request error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- The forwarding handler: target parsing, header assembly,
//!   and outbound dispatch with redirect following.
//! - [`server`] -- Shared application state, outbound HTTP client, Axum
//!   router, and shutdown signal handling.

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod run;
pub mod server;
