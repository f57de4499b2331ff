//! Analysis library for server telemetry
//!
//! This crate provides the core functionality for:
//! - Loading telemetry tables from CSV
//! - Descriptive statistics and distribution (normality) analysis
//! - Hour-of-day and per-date usage patterns
//! - Data-driven alert thresholds and anomaly detection
//! - Rule-based optimization recommendations
//! - PNG chart rendering and structured logging

pub mod anomaly;
pub mod distribution;
pub mod error;
pub mod loader;
pub mod models;
pub mod observability;
pub mod patterns;
pub mod pipeline;
pub mod recommendations;
pub mod render;
pub mod stats;
pub mod thresholds;

pub use error::{AnalysisError, Result};
pub use loader::{load_csv, read_csv};
pub use models::*;
pub use observability::StructuredLogger;
pub use pipeline::{AnalysisReport, Analyzer};
pub use render::{ChartInput, ChartRenderer, PngChartRenderer};
pub use thresholds::ThresholdMethod;
