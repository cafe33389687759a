//! Client-side logic for the lead dashboard: filtering, state aggregation,
//! calendar grouping, form handling and configuration.
//!
//! Nothing in here performs I/O except [`config`], which reads and writes the
//! TOML config file.

pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod forms;
pub mod leads;
pub mod money;
pub mod timefmt;

pub use lb_api_types as api;
