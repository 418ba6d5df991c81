//! Console logging for the `cairn` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job, so this module is compiled with the `cli` feature.

mod tracing_init;

pub use tracing_init::*;
