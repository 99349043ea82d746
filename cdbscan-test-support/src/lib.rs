//! Shared test utilities used across the cdbscan crates.
//!
//! [`tracing`] captures spans and events for instrumentation assertions;
//! [`ci`] holds the environment-driven property-test profile.

pub mod ci;
pub mod tracing;
