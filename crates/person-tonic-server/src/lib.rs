//! # `person-tonic-server`: gRPC CRUD service for people
//!
//! A tonic server exposing the `PersonService` defined in
//! [`person_tonic_core`], backed by a SQLite `person` table through sqlx.
//!
//! ## Highlights
//!
//! - **One transaction per RPC**: each call maps to exactly one store
//!   operation, begun and committed explicitly.
//! - **Absence is not failure**: unknown ids produce unset fields or `false`,
//!   never an error status.
//! - **Ephemeral by design**: the schema is recreated and reseeded (Alice,
//!   Bob, Charlie, Alice) on every start.
//! - **Operational surface**: health, reflection, gRPC-web, compression, and
//!   graceful shutdown.
//!
//! ## Module Overview
//!
//! - [`server`] - configuration, store, service, telemetry, and server wiring.

pub mod server;
