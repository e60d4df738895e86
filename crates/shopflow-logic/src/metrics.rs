//! Per-run shopper metrics.
//!
//! Owned by one simulation run and discarded afterwards. The mean
//! shopping time is maintained incrementally; it is never recomputed
//! from stored samples.

use crate::congestion::CongestionGrid;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregated metrics for one simulation run.
#[derive(Debug, Clone, Default)]
pub struct SimMetrics {
    pub total_customers: u32,
    pub completed_customers: u32,
    pub avg_shopping_time: f32,
    pub congestion: CongestionGrid,
}

impl SimMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_spawn(&mut self) {
        self.total_customers += 1;
    }

    /// Fold one completed shopper's elapsed time into the running mean.
    pub fn record_completion(&mut self, shopping_time: f32) {
        self.completed_customers += 1;
        self.avg_shopping_time +=
            (shopping_time - self.avg_shopping_time) / self.completed_customers as f32;
    }

    pub fn avg_congestion(&self) -> f32 {
        self.congestion.average()
    }

    pub fn bottleneck_count(&self) -> usize {
        self.congestion.bottlenecks().len()
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_customers: self.total_customers,
            completed_customers: self.completed_customers,
            avg_congestion: self.avg_congestion(),
            bottleneck_count: self.bottleneck_count() as u32,
            avg_shopping_time: self.avg_shopping_time,
            congestion_map: self.congestion.to_map(),
        }
    }
}

/// Metrics reporting shape used at component boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub total_customers: u32,
    pub completed_customers: u32,
    pub avg_congestion: f32,
    pub bottleneck_count: u32,
    pub avg_shopping_time: f32,
    pub congestion_map: HashMap<String, u32>,
}
