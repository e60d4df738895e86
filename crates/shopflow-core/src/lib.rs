//! ShopFlow Core - Store Floor Simulation Engine
//!
//! An ECS-based simulation of shoppers moving through a store layout,
//! plus a genetic optimizer that searches for better layouts.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) via `hecs`:
//! - **Entities**: Shopper agents
//! - **Components**: Pure data (Position, Target, Shopper)
//! - **Engine**: A tick loop that spawns, perceives, decides, moves,
//!   and retires agents, accumulating congestion and metrics
//!
//! # Example
//!
//! ```rust,no_run
//! use shopflow_core::prelude::*;
//! use std::sync::Arc;
//!
//! let mut sim = Simulation::new();
//! sim.start(Layout::default(), Arc::new(FallbackProvider), SimConfig::default())
//!     .unwrap();
//!
//! loop {
//!     sim.step(0.5);
//! }
//! ```

pub mod components;
pub mod engine;
pub mod optimizer;
pub mod perception;
pub mod provider;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{RunState, SimConfig, Simulation, StartError};
    pub use crate::optimizer::{GeneticOptimizer, OptimizerConfig, ProgressEvent, StopHandle};
    pub use crate::provider::{DecisionProvider, FallbackProvider};
    pub use shopflow_logic::layout::Layout;
}
