//! PrimeFire administration API server library.
//!
//! Exposes configuration, state, error handling, handlers and routes so
//! integration tests and the binary entrypoint share one router.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod query;
pub mod response;
pub mod routes;
pub mod state;
