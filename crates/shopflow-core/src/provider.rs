//! Decision provider interface and the decision memoization cache.
//!
//! The simulator consumes navigation decisions through [`DecisionProvider`],
//! a single-method trait. A network-backed implementation and the offline
//! [`FallbackProvider`] satisfy the same contract, so the simulation core
//! stays agnostic to how (or whether) decisions are made remotely.

use log::warn;
use shopflow_logic::decision::{cache_key, fallback_decision, Decision, DecisionRequest};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

/// A failed provider call. Never propagated past the decision dispatch:
/// the deterministic fallback answers instead.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionError {
    /// The provider call failed outright (transport, service error).
    Failed(String),
    /// The bounded wait elapsed before an answer arrived.
    Timeout,
    /// The provider answered with something unusable.
    Malformed(String),
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionError::Failed(reason) => write!(f, "decision call failed: {reason}"),
            DecisionError::Timeout => write!(f, "decision call timed out"),
            DecisionError::Malformed(reason) => write!(f, "malformed decision: {reason}"),
        }
    }
}

impl std::error::Error for DecisionError {}

/// Source of navigation decisions.
///
/// Implementations must bound their wait: a call that cannot complete
/// promptly returns [`DecisionError::Timeout`] rather than blocking the
/// tick loop indefinitely.
pub trait DecisionProvider: Send + Sync {
    fn decide(&self, request: &DecisionRequest) -> Result<Decision, DecisionError>;
}

/// The offline provider: pure, deterministic, infallible.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackProvider;

impl DecisionProvider for FallbackProvider {
    fn decide(&self, request: &DecisionRequest) -> Result<Decision, DecisionError> {
        Ok(fallback_decision(request))
    }
}

/// Memoization of decisions, keyed by the perception summary (sorted
/// visible labels, list, collected). The key is deliberately coarse, so
/// a cached answer can differ from a fresh one computed under different
/// crowd pressure; cached answers therefore must not cross run
/// boundaries where reproducibility matters. [`DecisionCache::global`]
/// is the process-wide instance with an explicit lifecycle (populated
/// during runs, cleared between them, no automatic expiry); evaluation
/// runs create their own instances instead. Concurrent inserts on the
/// same key are last-writer-wins.
#[derive(Default)]
pub struct DecisionCache {
    entries: Mutex<HashMap<String, Decision>>,
}

impl DecisionCache {
    /// The shared process-wide cache.
    pub fn global() -> &'static DecisionCache {
        static CACHE: OnceLock<DecisionCache> = OnceLock::new();
        CACHE.get_or_init(DecisionCache::default)
    }

    pub fn get(&self, key: &str) -> Option<Decision> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: String, decision: Decision) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, decision);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

/// Dispatch one decision through the given cache. A provider failure
/// falls back to the deterministic policy for this decision only; the
/// result is cached either way to bound external call volume.
pub fn cached_decide(
    cache: &DecisionCache,
    provider: &dyn DecisionProvider,
    request: &DecisionRequest,
) -> Decision {
    let key = cache_key(request);
    if let Some(hit) = cache.get(&key) {
        return hit;
    }
    let decision = match provider.decide(request) {
        Ok(decision) => decision,
        Err(err) => {
            warn!("decision provider failed ({err}); using fallback");
            fallback_decision(request)
        }
    };
    cache.insert(key, decision.clone());
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopflow_logic::decision::PerceivedSection;

    struct FailingProvider;

    impl DecisionProvider for FailingProvider {
        fn decide(&self, _request: &DecisionRequest) -> Result<Decision, DecisionError> {
            Err(DecisionError::Timeout)
        }
    }

    fn seen(label: &str, distance: f32, crowd: u32) -> PerceivedSection {
        PerceivedSection {
            label: label.to_string(),
            distance,
            crowd_count: crowd,
        }
    }

    fn request(labels: &[&str], list: &[&str]) -> DecisionRequest {
        DecisionRequest {
            visible_sections: labels.iter().map(|label| seen(label, 10.0, 0)).collect(),
            shopping_list: list.iter().map(|s| s.to_string()).collect(),
            collected: Vec::new(),
        }
    }

    #[test]
    fn provider_failure_recovers_via_fallback() {
        let cache = DecisionCache::default();
        let req = request(&["Dairy"], &["Dairy"]);
        let decision = cached_decide(&cache, &FailingProvider, &req);
        assert_eq!(decision, Decision::product("Dairy"));
    }

    #[test]
    fn cache_hit_skips_the_provider() {
        let cache = DecisionCache::default();
        let req = request(&["Bakery"], &["Bakery"]);
        let first = cached_decide(&cache, &FallbackProvider, &req);
        // A failing provider now answers from the cache.
        let second = cached_decide(&cache, &FailingProvider, &req);
        assert_eq!(first, second);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = DecisionCache::default();
        let req = request(&["Frozen"], &["Frozen"]);
        cached_decide(&cache, &FallbackProvider, &req);
        cache.clear();
        assert!(cache.get(&cache_key(&req)).is_none());
    }

    #[test]
    fn run_scoped_caches_answer_for_their_own_run() {
        // Same coarse cache key, different crowd pressure: the fallback
        // answers differently, so each run's cache must answer for itself
        // rather than serving another run's decision.
        let calm = DecisionRequest {
            visible_sections: vec![seen("Dairy", 30.0, 0), seen("Bakery", 90.0, 2)],
            shopping_list: vec!["Dairy".into(), "Bakery".into()],
            collected: Vec::new(),
        };
        let mut crowded = calm.clone();
        crowded.visible_sections[0].crowd_count = 5;
        crowded.visible_sections[1].crowd_count = 0;
        assert_eq!(cache_key(&calm), cache_key(&crowded));

        let run_a = DecisionCache::default();
        let run_b = DecisionCache::default();
        assert_eq!(
            cached_decide(&run_a, &FallbackProvider, &calm),
            Decision::product("Dairy")
        );
        assert_eq!(
            cached_decide(&run_b, &FallbackProvider, &crowded),
            Decision::product("Bakery")
        );
    }
}
