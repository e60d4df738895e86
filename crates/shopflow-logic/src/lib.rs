//! Pure simulation logic for ShopFlow.
//!
//! This crate contains all store-floor logic that is independent of any
//! engine, runtime, or external service. Functions take plain data and
//! return results, making them unit-testable and portable between the
//! simulation engine, the optimizer, and headless tooling.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`congestion`] | Grid-based occupancy accumulation and bottleneck detection |
//! | [`constants`] | Tuning constants (radii, timers, grid size, section floors) |
//! | [`decision`] | Navigation decision types and the deterministic fallback policy |
//! | [`fitness`] | Scalar fitness scoring for layout variants |
//! | [`geometry`] | Point/segment math: distances, proper intersection |
//! | [`layout`] | Floor-plan model (walls, openings, sections, checkouts) and validation |
//! | [`metrics`] | Per-run shopper metrics with incremental mean shopping time |

pub mod congestion;
pub mod constants;
pub mod decision;
pub mod fitness;
pub mod geometry;
pub mod layout;
pub mod metrics;
