//! HTTP API layer
//!
//! Axum routers, request handlers, wire models and the server itself.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;

pub use server::ApiServer;
