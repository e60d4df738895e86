//! Integration tests for the genetic optimizer.
//!
//! Uses small populations and short evaluation runs so each test stays
//! fast; all randomness is seeded.

use shopflow_core::engine::SimConfig;
use shopflow_core::optimizer::{GeneticOptimizer, OptimizerConfig, ProgressEvent};
use shopflow_logic::fitness::WORST_FITNESS;
use shopflow_logic::geometry::Point;
use shopflow_logic::layout::{Checkout, Layout, Opening, OpeningRole, ProductSection, Wall};

// ── Helpers ────────────────────────────────────────────────────────────

fn section(label: &str, x: f32, y: f32) -> ProductSection {
    ProductSection {
        x,
        y,
        width: 80.0,
        height: 60.0,
        label: label.into(),
    }
}

fn store_layout() -> Layout {
    Layout {
        walls: vec![Wall::new(Point::new(0.0, 0.0), Point::new(800.0, 0.0))],
        openings: vec![
            Opening {
                role: OpeningRole::Entrance,
                wall: Some(0),
                offset: 50.0,
                length: 60.0,
            },
            Opening {
                role: OpeningRole::Exit,
                wall: Some(0),
                offset: 650.0,
                length: 60.0,
            },
        ],
        products: vec![
            section("Dairy", 100.0, 150.0),
            section("Bakery", 300.0, 150.0),
            section("Produce", 500.0, 150.0),
        ],
        checkouts: vec![Checkout { x: 300.0, y: 60.0 }, Checkout { x: 450.0, y: 60.0 }],
    }
}

fn fast_config(seed: u64) -> OptimizerConfig {
    OptimizerConfig {
        population_size: 4,
        target_completed: 3,
        max_sim_time: 40.0,
        step_dt: 0.5,
        sim: SimConfig {
            max_agents: 6,
            ..SimConfig::default()
        },
        rng_seed: seed,
        ..OptimizerConfig::default()
    }
}

fn sorted_labels(layout: &Layout) -> Vec<String> {
    let mut labels: Vec<String> = layout.products.iter().map(|s| s.label.clone()).collect();
    labels.sort();
    labels
}

// ── Single generation ──────────────────────────────────────────────────

#[test]
fn one_generation_scores_the_initial_population() {
    let mut optimizer = GeneticOptimizer::new(store_layout(), fast_config(5)).unwrap();
    let mut events: Vec<ProgressEvent> = Vec::new();
    let result = optimizer.optimize(1, |event| events.push(event.clone()));

    assert_eq!(result.generations_run, 1);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].generation, 0);
    assert_eq!(result.best_fitness, events[0].best_fitness);
    assert!(result.best_fitness > WORST_FITNESS);
    assert!(result.best_fitness >= events[0].avg_fitness);
    // Search moves positions and sizes, never the assortment.
    assert_eq!(sorted_labels(&result.best_layout), sorted_labels(&store_layout()));
}

// ── Multi-generation properties ────────────────────────────────────────

#[test]
fn best_fitness_never_regresses() {
    let mut optimizer = GeneticOptimizer::new(store_layout(), fast_config(6)).unwrap();
    let mut best_seen: Vec<f32> = Vec::new();
    let result = optimizer.optimize(3, |event| best_seen.push(event.best_fitness));

    assert_eq!(result.generations_run, 3);
    for pair in best_seen.windows(2) {
        assert!(pair[1] >= pair[0], "elite best regressed: {best_seen:?}");
    }
    assert_eq!(result.best_fitness, *best_seen.last().unwrap());
}

#[test]
fn same_seed_reproduces_the_run() {
    let run = |seed: u64| {
        let mut optimizer = GeneticOptimizer::new(store_layout(), fast_config(seed)).unwrap();
        optimizer.optimize(2, |_| {})
    };
    let a = run(9);
    let b = run(9);
    assert_eq!(a.best_fitness, b.best_fitness);
    assert_eq!(a.best_layout, b.best_layout);
}

// ── Cancellation ───────────────────────────────────────────────────────

#[test]
fn stop_before_run_returns_the_base_layout() {
    let mut optimizer = GeneticOptimizer::new(store_layout(), fast_config(7)).unwrap();
    optimizer.stop_handle().stop();
    let result = optimizer.optimize(5, |_| panic!("no generation should run"));

    assert_eq!(result.generations_run, 0);
    assert_eq!(result.best_fitness, WORST_FITNESS);
    assert_eq!(result.best_layout, store_layout());
}

#[test]
fn stop_takes_effect_at_the_next_generation_boundary() {
    let mut optimizer = GeneticOptimizer::new(store_layout(), fast_config(8)).unwrap();
    let handle = optimizer.stop_handle();
    let result = optimizer.optimize(5, |_| handle.stop());

    // The in-flight generation finishes; no further ones start.
    assert_eq!(result.generations_run, 1);
    assert!(result.best_fitness > WORST_FITNESS);
}
