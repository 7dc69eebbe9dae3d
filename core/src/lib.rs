//! Synchronous API client core for the items service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core deterministic and testable.
//!
//! # Design
//! - `ItemClient` is stateless; it holds only `base_url`.
//! - Each route is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - DTOs are defined independently from the server crate; integration tests
//!   catch schema drift.
//! - `config` resolves the database DSN for both binaries.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::ItemClient;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{AnalyzeRequest, AnalyzeResponse, CreateItem, ErrorBody, EstimatedData, Item};
