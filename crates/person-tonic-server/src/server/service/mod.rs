//! gRPC service implementation.
//!
//! This module contains the client-facing side of the server: decoding each
//! RPC, delegating to the [`PersonStore`](crate::server::store::PersonStore),
//! and mapping results, absence and failures into responses.
//!
//! ## Structure
//!
//! - [`handler`] - gRPC service entry point (`PersonHandler`).

pub mod handler;
