//! Scalar fitness scoring for layout variants. Higher is better.

use serde::{Deserialize, Serialize};

/// Fitness assigned to a layout variant whose evaluation failed.
pub const WORST_FITNESS: f32 = f32::MIN;

/// Weights for the fitness formula:
/// `base − congestion·avgCongestion − bottleneck·bottlenecks − time·avgShoppingTime`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    pub base: f32,
    pub congestion: f32,
    pub bottleneck: f32,
    pub time: f32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            base: 1000.0,
            congestion: 10.0,
            bottleneck: 5.0,
            time: 0.5,
        }
    }
}

impl FitnessWeights {
    pub fn score(&self, avg_congestion: f32, bottleneck_count: u32, avg_shopping_time: f32) -> f32 {
        self.base
            - self.congestion * avg_congestion
            - self.bottleneck * bottleneck_count as f32
            - self.time * avg_shopping_time
    }
}
