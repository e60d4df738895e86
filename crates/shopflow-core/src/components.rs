//! ECS components for shopper agents.

use serde::{Deserialize, Serialize};
use shopflow_logic::decision::list_covered;
use shopflow_logic::geometry::Point;

/// 2D position/direction vector.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Point::new(v.x, v.y)
    }
}

/// Stable per-run agent identity, assigned in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentId(pub u64);

/// Where an agent currently stands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub pos: Vec2,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
}

/// What kind of place an agent is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    None,
    Product,
    Checkout,
    Exit,
}

/// The agent's current navigation target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub point: Vec2,
    /// Product label, for `TargetKind::Product` arrivals.
    pub label: Option<String>,
}

impl Target {
    pub fn none() -> Self {
        Self {
            kind: TargetKind::None,
            point: Vec2::ZERO,
            label: None,
        }
    }

    pub fn product(point: Vec2, label: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Product,
            point,
            label: Some(label.into()),
        }
    }

    pub fn checkout(point: Vec2) -> Self {
        Self {
            kind: TargetKind::Checkout,
            point,
            label: None,
        }
    }

    pub fn exit(point: Vec2) -> Self {
        Self {
            kind: TargetKind::Exit,
            point,
            label: None,
        }
    }
}

/// Lifecycle of a shopper. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopperStatus {
    Shopping,
    Checkout,
    Exiting,
    Exited,
}

impl ShopperStatus {
    /// Move to `next` only if it is further along the lifecycle.
    pub fn advance(&mut self, next: ShopperStatus) {
        if next > *self {
            *self = next;
        }
    }
}

/// Shopper state: list, progress, timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shopper {
    pub shopping_list: Vec<String>,
    pub collected: Vec<String>,
    pub status: ShopperStatus,
    /// Seconds of remaining dwell; movement is skipped while positive.
    pub wait_timer: f32,
    /// Seconds since the last perception/decision query.
    pub since_decision: f32,
    pub vision_range: f32,
    pub speed: f32,
    /// Simulation time at spawn, for shopping-time metrics.
    pub spawn_time: f64,
}

impl Shopper {
    pub fn new(shopping_list: Vec<String>, vision_range: f32, speed: f32, spawn_time: f64) -> Self {
        Self {
            shopping_list,
            collected: Vec::new(),
            status: ShopperStatus::Shopping,
            wait_timer: 0.0,
            // Start ripe so the first update queries a decision immediately.
            since_decision: f32::MAX,
            vision_range,
            speed,
            spawn_time,
        }
    }

    /// Advance the decision timer, saturating at the ripe ceiling.
    pub fn tick_decision_timer(&mut self, dt: f32) {
        if self.since_decision < f32::MAX - dt {
            self.since_decision += dt;
        }
    }

    /// Record a pickup if the label is still needed. Returns whether the
    /// item was actually collected.
    pub fn collect(&mut self, label: &str) -> bool {
        let needed = self
            .shopping_list
            .iter()
            .filter(|item| item.as_str() == label)
            .count();
        let have = self
            .collected
            .iter()
            .filter(|item| item.as_str() == label)
            .count();
        if have < needed {
            self.collected.push(label.to_string());
            true
        } else {
            false
        }
    }

    pub fn has_all_items(&self) -> bool {
        list_covered(&self.shopping_list, &self.collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);
        assert_eq!((b - a).y, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        assert!((b.length() - (52.0f32).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn status_never_reverts() {
        let mut status = ShopperStatus::Shopping;
        status.advance(ShopperStatus::Exiting);
        assert_eq!(status, ShopperStatus::Exiting);
        status.advance(ShopperStatus::Checkout);
        assert_eq!(status, ShopperStatus::Exiting);
        status.advance(ShopperStatus::Exited);
        assert_eq!(status, ShopperStatus::Exited);
    }

    #[test]
    fn collect_respects_list_multiplicity() {
        let mut shopper = Shopper::new(
            vec!["Dairy".into(), "Dairy".into()],
            250.0,
            50.0,
            0.0,
        );
        assert!(shopper.collect("Dairy"));
        assert!(!shopper.has_all_items());
        assert!(shopper.collect("Dairy"));
        assert!(shopper.has_all_items());
        // A third copy is refused: collected stays a subset of the list.
        assert!(!shopper.collect("Dairy"));
        assert!(!shopper.collect("Bakery"));
        assert_eq!(shopper.collected.len(), 2);
    }
}
