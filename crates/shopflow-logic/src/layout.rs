//! Floor-plan model and validation.
//!
//! A [`Layout`] is immutable for the duration of one simulation run:
//! walls, wall-mounted openings (entrances and exits), rectangular
//! product sections, and checkout points. Serde field names follow the
//! exchange shape used at component boundaries (camelCase, `wallIndex`).
//!
//! The opening's wall reference is an explicit `Option<usize>` rather
//! than an index with a zero sentinel. An opening with `wall: None` is
//! inert: it never spawns shoppers and is never an exit target, and
//! validation reports it as a warning.

use crate::constants::{MIN_SECTION_HEIGHT, MIN_SECTION_WIDTH};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub start: Point,
    pub end: Point,
}

impl Wall {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }

    /// Point at `offset` units along the wall from its start.
    pub fn point_at(&self, offset: f32) -> Point {
        let len = self.length();
        if len <= f32::EPSILON {
            return self.start;
        }
        let t = offset / len;
        Point::new(
            self.start.x + t * (self.end.x - self.start.x),
            self.start.y + t * (self.end.y - self.start.y),
        )
    }
}

/// Whether an opening lets shoppers in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningRole {
    Entrance,
    Exit,
}

/// An entrance or exit: a sub-span of a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opening {
    pub role: OpeningRole,
    #[serde(rename = "wallIndex")]
    pub wall: Option<usize>,
    pub offset: f32,
    pub length: f32,
}

/// A rectangular shelf area holding one product label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: String,
}

impl ProductSection {
    pub fn centroid(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A checkout counter position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    pub x: f32,
    pub y: f32,
}

impl Checkout {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A complete floor plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub walls: Vec<Wall>,
    pub openings: Vec<Opening>,
    pub products: Vec<ProductSection>,
    pub checkouts: Vec<Checkout>,
}

impl Layout {
    /// Midpoint of an opening's span on its wall, if the wall resolves.
    pub fn opening_midpoint(&self, opening: &Opening) -> Option<Point> {
        let wall = self.walls.get(opening.wall?)?;
        Some(wall.point_at(opening.offset + opening.length / 2.0))
    }

    /// Resolved midpoints of all openings with the given role.
    pub fn opening_points(&self, role: OpeningRole) -> Vec<Point> {
        self.openings
            .iter()
            .filter(|o| o.role == role)
            .filter_map(|o| self.opening_midpoint(o))
            .collect()
    }

    /// Distinct product labels, in section order.
    pub fn product_labels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .filter(|s| seen.insert(s.label.clone()))
            .map(|s| s.label.clone())
            .collect()
    }

    /// First section carrying the given label.
    pub fn section_by_label(&self, label: &str) -> Option<&ProductSection> {
        self.products.iter().find(|s| s.label == label)
    }
}

// ── Validation ──────────────────────────────────────────────────────────

/// Issue severity: errors block a simulation run, warnings do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A layout validation finding.
#[derive(Debug, Clone)]
pub struct LayoutIssue {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Check that every opening's wall reference resolves and that its span
/// fits on the wall. Detached openings (`wall: None`) are warnings.
pub fn check_openings(layout: &Layout) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();
    for (i, opening) in layout.openings.iter().enumerate() {
        match opening.wall {
            None => issues.push(LayoutIssue {
                category: "opening",
                severity: Severity::Warning,
                message: format!("Opening #{i} has no wall reference and will be ignored"),
            }),
            Some(w) => match layout.walls.get(w) {
                None => issues.push(LayoutIssue {
                    category: "opening",
                    severity: Severity::Error,
                    message: format!(
                        "Opening #{i} references wall {w} but only {} walls exist",
                        layout.walls.len()
                    ),
                }),
                Some(wall) => {
                    if opening.offset + opening.length > wall.length() + 0.5 {
                        issues.push(LayoutIssue {
                            category: "opening",
                            severity: Severity::Error,
                            message: format!(
                                "Opening #{i} span {:.1}+{:.1} exceeds wall {w} length {:.1}",
                                opening.offset,
                                opening.length,
                                wall.length()
                            ),
                        });
                    }
                }
            },
        }
    }
    issues
}

/// Check that a layout has the features a simulation run needs.
///
/// Missing entrances/exits/products/checkouts are warnings: a degenerate
/// layout still runs, it just spawns or completes no one.
pub fn check_required_features(layout: &Layout) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();
    let mut warn = |message: String| {
        issues.push(LayoutIssue {
            category: "features",
            severity: Severity::Warning,
            message,
        })
    };
    if layout.opening_points(OpeningRole::Entrance).is_empty() {
        warn("Layout has no usable entrance; no shoppers will spawn".into());
    }
    if layout.opening_points(OpeningRole::Exit).is_empty() {
        warn("Layout has no usable exit; shoppers cannot complete".into());
    }
    if layout.products.is_empty() {
        warn("Layout has no product sections".into());
    }
    if layout.checkouts.is_empty() {
        warn("Layout has no checkouts".into());
    }
    issues
}

/// Check that no product section has non-positive dimensions.
pub fn check_section_dimensions(layout: &Layout) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();
    for s in &layout.products {
        if s.width <= 0.0 || s.height <= 0.0 {
            issues.push(LayoutIssue {
                category: "section",
                severity: Severity::Error,
                message: format!(
                    "Section '{}' has non-positive dimensions: {}×{}",
                    s.label, s.width, s.height
                ),
            });
        } else if s.width < MIN_SECTION_WIDTH || s.height < MIN_SECTION_HEIGHT {
            issues.push(LayoutIssue {
                category: "section",
                severity: Severity::Warning,
                message: format!(
                    "Section '{}' is below the {}×{} floor: {}×{}",
                    s.label, MIN_SECTION_WIDTH, MIN_SECTION_HEIGHT, s.width, s.height
                ),
            });
        }
    }
    issues
}

/// Check for duplicate product labels (degrades shopping-list semantics:
/// only the first section with a label is ever targeted).
pub fn check_duplicate_labels(layout: &Layout) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for s in &layout.products {
        if !seen.insert(s.label.as_str()) {
            issues.push(LayoutIssue {
                category: "section",
                severity: Severity::Warning,
                message: format!("Duplicate product label '{}'", s.label),
            });
        }
    }
    issues
}

/// Run all layout validations and return combined findings.
pub fn validate_layout(layout: &Layout) -> Vec<LayoutIssue> {
    let mut all = Vec::new();
    all.extend(check_openings(layout));
    all.extend(check_required_features(layout));
    all.extend(check_section_dimensions(layout));
    all.extend(check_duplicate_labels(layout));
    all
}

/// Whether any finding in the set is a hard error.
pub fn has_errors(issues: &[LayoutIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
