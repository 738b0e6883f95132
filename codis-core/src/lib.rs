//! Core library for the `codis` CLI.
//!
//! This crate defines:
//! - Domain models (station queries, flattened observation records, station
//!   metadata) and the fixed CSV schema
//! - The CODiS HTTP client, with exponential-backoff retry for transient
//!   failures
//! - Flattening of the nested observation payload into the tabular schema
//! - The range-chunking pipeline and CSV export
//!
//! It is used by `codis-cli`, but can also be reused by other binaries or
//! services.

pub mod client;
pub mod dates;
pub mod export;
pub mod flatten;
pub mod model;
pub mod pipeline;

pub use client::{ApiError, ReportSource, RetryPolicy, StationClient};
pub use dates::{DateParseError, parse_flexible};
pub use export::ExportError;
pub use model::{CSV_COLUMNS, InvalidRange, ObservationRecord, StationItem, StationQuery};
