//! exambot Gateway HTTP Server
//!
//! Receives chat-platform updates on the webhook route and hands them to the
//! dispatcher. Also serves a liveness probe.

pub mod server;
pub mod webhook;

pub use server::{build_router, start_server, GatewayState};
