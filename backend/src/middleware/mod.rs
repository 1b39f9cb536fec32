//! Request middleware.
//!
//! Purpose: correlate every request with a trace identifier that also appears
//! in logs and error payloads.

pub mod trace;

pub use trace::Trace;
