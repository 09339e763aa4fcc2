//! # Time MCP Server Core
//!
//! Stateless time operations shared by every transport.
//!
//! ## Features
//! - Current time in UTC, an IANA timezone, a numeric offset or a common abbreviation
//! - Unix timestamps
//! - Token-based formatting (`YYYY-MM-DD HH:mm:ss`) with injection-pattern rejection
//!
//! ## Modules
//! - `error`: Time, registry and tool invocation errors
//! - `models`: Tool request models and per-invocation values
//! - `provider`: `TimeOperations`, the time computations themselves
//! - `utils`: Format-token translation, offsets and abbreviation tables

pub mod error;
pub mod models;
pub mod provider;
pub mod utils;
