//! # Meridian Return Engine
//!
//! This crate turns a daily price-bar series into dividend-adjusted total
//! returns, calendar aggregates and the standard performance metrics. It is
//! the numerical heart of the system.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of external systems. It
//!   depends only on `core-types` and never performs I/O.
//! - **Stateless Calculation:** The `ReturnEngine` is a stateless calculator.
//!   It takes bars and returns as input and produces plain data as output,
//!   which makes it highly reliable and easy to test.
//! - **Total Functions:** Degenerate numeric inputs (short series, zero prior
//!   closes, constant returns) resolve to zeros rather than errors. Once data
//!   exists, analysis cannot fail.
//!
//! ## Public API
//!
//! - `ReturnEngine`: The main struct that contains the calculation logic.
//! - `PerformanceMetrics`: The standardized report of scalar metrics.
//! - `PeriodicReturn`: One compounded calendar bucket of returns.
//! - `build_summary`: Formats the ordered key-metrics table.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod report;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{ReturnEngine, TRADING_DAYS_PER_YEAR};
pub use report::{PerformanceMetrics, PeriodicReturn};
pub use summary::{SummaryRow, build_summary};
