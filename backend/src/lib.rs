//! Points ledger and reward redemption backend.
//!
//! The crate is laid out hexagonally: [`domain`] holds entities, ports and
//! services; [`outbound`] holds the PostgreSQL and in-memory adapters;
//! [`inbound`] exposes the HTTP surface.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
