//! Tuning constants shared by the simulator and optimizer.
//!
//! All distances are in layout units, all durations in simulated seconds.

/// Side length of one congestion grid cell.
pub const CELL_SIZE: f32 = 50.0;

/// A cell with at least this many occupants counts as a bottleneck.
pub const BOTTLENECK_THRESHOLD: u32 = 3;

/// Distance at which an agent is considered to have reached its target.
pub const ARRIVAL_RADIUS: f32 = 15.0;

/// Below this distance to the target the agent stands still for the tick.
pub const STOP_RADIUS: f32 = 5.0;

/// Another agent inside this radius triggers the crowd-avoidance heuristic.
pub const CROWD_RADIUS: f32 = 20.0;

/// Speed multiplier applied while crowded.
pub const CROWD_SPEED_FACTOR: f32 = 0.5;

/// Maximum heading perturbation (radians, either direction) while crowded.
pub const HEADING_JITTER_MAX: f32 = 0.5;

/// Radius around a section centroid used for the perceived local crowd count.
pub const LOCAL_CROWD_RADIUS: f32 = 50.0;

/// Seconds between perception/decision queries per agent.
pub const DECISION_INTERVAL: f32 = 2.0;

/// Seconds an agent dwells after picking up an item.
pub const COLLECT_WAIT: f32 = 3.0;

/// Seconds an agent dwells at a checkout.
pub const CHECKOUT_WAIT: f32 = 5.0;

/// Shopping list length bounds (clamped to the number of distinct labels).
pub const LIST_MIN: usize = 3;
pub const LIST_MAX: usize = 5;

/// Minimum product section dimensions after any resize mutation.
pub const MIN_SECTION_WIDTH: f32 = 60.0;
pub const MIN_SECTION_HEIGHT: f32 = 40.0;
