//! Agent perception: which product sections are visible from where.
//!
//! A section is visible when its centroid is within vision range and the
//! sightline to it crosses no wall segment. Openings are not cut out of
//! their walls here; a wall blocks sight across its whole span.

use crate::components::Vec2;
use shopflow_logic::constants::LOCAL_CROWD_RADIUS;
use shopflow_logic::decision::PerceivedSection;
use shopflow_logic::geometry::{segments_intersect, Point};
use shopflow_logic::layout::Layout;

/// Whether the segment `from`-`to` crosses any wall.
pub fn sight_blocked(from: Point, to: Point, layout: &Layout) -> bool {
    layout
        .walls
        .iter()
        .any(|wall| segments_intersect(from, to, wall.start, wall.end))
}

/// Sections visible from `from`, with distance and local crowd counts.
///
/// `crowd` holds every active agent position; agents within
/// [`LOCAL_CROWD_RADIUS`] of a section's centroid count toward that
/// section's crowd.
pub fn visible_sections(
    from: Vec2,
    vision_range: f32,
    layout: &Layout,
    crowd: &[Vec2],
) -> Vec<PerceivedSection> {
    let eye: Point = from.into();
    layout
        .products
        .iter()
        .filter_map(|section| {
            let centroid = section.centroid();
            let distance = eye.distance(&centroid);
            if distance > vision_range || sight_blocked(eye, centroid, layout) {
                return None;
            }
            let crowd_count = crowd
                .iter()
                .filter(|p| Vec2::from(centroid).distance(p) <= LOCAL_CROWD_RADIUS)
                .count() as u32;
            Some(PerceivedSection {
                label: section.label.clone(),
                distance,
                crowd_count,
            })
        })
        .collect()
}
