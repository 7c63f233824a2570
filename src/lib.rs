//! AHP Engine - Analytic Hierarchy Process priority and consistency engine
//!
//! This crate derives priority weights from pairwise-comparison judgments,
//! checks their consistency, aggregates criteria hierarchies and evaluator
//! groups, and measures how robust the final ranking is under weight
//! perturbation. The `http` adapter serves it as a JSON API.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
