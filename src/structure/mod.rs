//! Structural node metrics.
//!
//! [`StructureMetrics`] precomputes degree, closeness and eigenvector
//! centrality once per graph and blends them into a time-varying score:
//! early generations favor dispersed, high-reach nodes (closeness-heavy),
//! late generations favor locally dense nodes (degree-heavy).
//!
//! # References
//!
//! - Freeman (1978), "Centrality in Social Networks: Conceptual Clarification"
//! - Wasserman & Faust (1994), *Social Network Analysis*
//! - Bonacich (1987), "Power and Centrality: A Family of Measures"

pub mod centrality;
mod metrics;

pub use metrics::{StructureMetrics, LOW_DEGREE_MAX, MID_DEGREE_MAX};
