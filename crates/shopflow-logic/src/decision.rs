//! Navigation decision types and the deterministic fallback policy.
//!
//! The simulator consumes decisions through a single-method provider
//! interface; this module defines the request/response shapes exchanged
//! with any provider implementation and the offline fallback the
//! simulator uses when a provider is absent, fails, or times out.

use serde::{Deserialize, Serialize};

/// What kind of target a decision selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Product,
    Checkout,
    Exit,
}

/// A navigation decision: head for a product (by label), a checkout,
/// or an exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub kind: DecisionKind,
    pub target: Option<String>,
}

impl Decision {
    pub fn product(label: impl Into<String>) -> Self {
        Self {
            kind: DecisionKind::Product,
            target: Some(label.into()),
        }
    }

    pub fn checkout() -> Self {
        Self {
            kind: DecisionKind::Checkout,
            target: None,
        }
    }

    pub fn exit() -> Self {
        Self {
            kind: DecisionKind::Exit,
            target: None,
        }
    }
}

/// One product section as seen by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerceivedSection {
    pub label: String,
    pub distance: f32,
    pub crowd_count: u32,
}

/// An agent's local perception handed to the decision provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub visible_sections: Vec<PerceivedSection>,
    pub shopping_list: Vec<String>,
    pub collected: Vec<String>,
}

/// Labels still needed: shopping-list entries (a multiset) whose count
/// is not yet covered by the collected items.
pub fn remaining_items(shopping_list: &[String], collected: &[String]) -> Vec<String> {
    let mut remaining = Vec::new();
    let mut available: Vec<&String> = collected.iter().collect();
    for item in shopping_list {
        if let Some(pos) = available.iter().position(|c| *c == item) {
            available.swap_remove(pos);
        } else {
            remaining.push(item.clone());
        }
    }
    remaining
}

/// Whether the collected items cover the entire shopping list.
pub fn list_covered(shopping_list: &[String], collected: &[String]) -> bool {
    remaining_items(shopping_list, collected).is_empty()
}

/// Deterministic offline decision policy.
///
/// All needed items collected: checkout. Otherwise the best visible
/// section matching an uncollected item, ordered by (crowd ascending,
/// distance ascending). If none match, the nearest visible section
/// regardless of need. If nothing is visible at all: checkout.
pub fn fallback_decision(request: &DecisionRequest) -> Decision {
    let remaining = remaining_items(&request.shopping_list, &request.collected);
    if remaining.is_empty() {
        return Decision::checkout();
    }

    let mut needed: Vec<&PerceivedSection> = request
        .visible_sections
        .iter()
        .filter(|s| remaining.iter().any(|r| *r == s.label))
        .collect();
    needed.sort_by(|a, b| {
        a.crowd_count
            .cmp(&b.crowd_count)
            .then(a.distance.total_cmp(&b.distance))
    });
    if let Some(best) = needed.first() {
        return Decision::product(best.label.clone());
    }

    if let Some(nearest) = request
        .visible_sections
        .iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
    {
        return Decision::product(nearest.label.clone());
    }

    Decision::checkout()
}

/// Memoization key: sorted visible-label set, sorted list, sorted
/// collected set. Distances and crowd counts are deliberately excluded
/// so the key stays coarse enough to bound external call volume.
pub fn cache_key(request: &DecisionRequest) -> String {
    let mut labels: Vec<&str> = request
        .visible_sections
        .iter()
        .map(|s| s.label.as_str())
        .collect();
    labels.sort_unstable();
    labels.dedup();
    let mut list: Vec<&str> = request.shopping_list.iter().map(String::as_str).collect();
    list.sort_unstable();
    let mut collected: Vec<&str> = request.collected.iter().map(String::as_str).collect();
    collected.sort_unstable();
    format!(
        "v:{}|l:{}|c:{}",
        labels.join(","),
        list.join(","),
        collected.join(",")
    )
}
