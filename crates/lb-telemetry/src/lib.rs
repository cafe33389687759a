//! Logging setup shared by the leadboard binaries.
//!
//! Human-readable or JSON output via `tracing-subscriber`, filtered by
//! `RUST_LOG` with a per-binary default level.

pub mod logging;
