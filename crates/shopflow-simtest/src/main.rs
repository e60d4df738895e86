//! ShopFlow Headless Simulation Harness
//!
//! Validates store-floor logic, the simulation engine, and the layout
//! optimizer entirely in-process — no frontend, no networking.
//!
//! Usage:
//!   cargo run -p shopflow-simtest
//!   cargo run -p shopflow-simtest -- --verbose

use shopflow_core::engine::{SimConfig, Simulation};
use shopflow_core::optimizer::{GeneticOptimizer, OptimizerConfig};
use shopflow_core::provider::FallbackProvider;
use shopflow_logic::congestion::CongestionGrid;
use shopflow_logic::decision::{fallback_decision, Decision, DecisionRequest, PerceivedSection};
use shopflow_logic::fitness::WORST_FITNESS;
use shopflow_logic::geometry::{point_segment_distance, segments_intersect, Point};
use shopflow_logic::layout::{has_errors, validate_layout, Layout, OpeningRole};
use std::sync::Arc;

// ── Sample layouts (same JSON a frontend would submit) ──────────────────
const LAYOUTS_JSON: &str = include_str!("../../../data/store_layout.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== ShopFlow Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Layout exchange shape and validation
    let layouts = match parse_layouts(&mut results) {
        Some(layouts) => layouts,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Geometry sweep
    results.extend(validate_geometry(verbose));

    // 3. Fallback decision sweep
    results.extend(validate_fallback_decisions(verbose));

    // 4. Congestion grid
    results.extend(validate_congestion(verbose));

    // 5. End-to-end simulation run
    results.extend(run_simulation(&layouts[0], verbose));

    // 6. Optimizer smoke run
    results.extend(run_optimizer(&layouts[0], verbose));

    report(&results, verbose);
}

fn report(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Layout exchange shape ────────────────────────────────────────────

fn parse_layouts(results: &mut Vec<TestResult>) -> Option<Vec<Layout>> {
    println!("--- Layout Exchange Shape ---");

    let layouts: Vec<Layout> = match serde_json::from_str(LAYOUTS_JSON) {
        Ok(l) => l,
        Err(e) => {
            results.push(TestResult {
                name: "layout_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "layout_parse".into(),
        passed: !layouts.is_empty(),
        detail: format!("{} sample layouts loaded", layouts.len()),
    });
    if layouts.is_empty() {
        return None;
    }

    for (i, layout) in layouts.iter().enumerate() {
        let issues = validate_layout(layout);
        results.push(TestResult {
            name: format!("layout_{}_valid", i),
            passed: !has_errors(&issues),
            detail: format!("{} findings, none fatal expected", issues.len()),
        });
        results.push(TestResult {
            name: format!("layout_{}_openings_resolve", i),
            passed: !layout.opening_points(OpeningRole::Entrance).is_empty()
                && !layout.opening_points(OpeningRole::Exit).is_empty(),
            detail: "entrance and exit midpoints resolve".into(),
        });
    }

    // Round trip back through the exchange shape.
    let json = serde_json::to_string(&layouts).unwrap_or_default();
    results.push(TestResult {
        name: "layout_round_trip".into(),
        passed: json.contains("\"wallIndex\"") && json.contains("\"entrance\""),
        detail: "camelCase field names survive serialization".into(),
    });

    Some(layouts)
}

// ── 2. Geometry ─────────────────────────────────────────────────────────

fn validate_geometry(_verbose: bool) -> Vec<TestResult> {
    println!("--- Geometry ---");
    let mut results = Vec::new();

    let d = Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0));
    results.push(TestResult {
        name: "distance".into(),
        passed: (d - 5.0).abs() < 1e-6,
        detail: format!("3-4-5 triangle: {}", d),
    });

    let seg = point_segment_distance(
        Point::new(5.0, 5.0),
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
    );
    results.push(TestResult {
        name: "point_segment_distance".into(),
        passed: (seg - 5.0).abs() < 1e-6,
        detail: format!("perpendicular drop: {}", seg),
    });

    let crossing = segments_intersect(
        Point::new(0.0, -1.0),
        Point::new(0.0, 1.0),
        Point::new(-1.0, 0.0),
        Point::new(1.0, 0.0),
    );
    let touching = segments_intersect(
        Point::new(0.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 0.0),
        Point::new(1.0, -1.0),
    );
    results.push(TestResult {
        name: "proper_intersection".into(),
        passed: crossing && !touching,
        detail: format!("crossing={}, endpoint touch={}", crossing, touching),
    });

    results
}

// ── 3. Fallback decisions ───────────────────────────────────────────────

fn validate_fallback_decisions(_verbose: bool) -> Vec<TestResult> {
    println!("--- Fallback Decisions ---");
    let mut results = Vec::new();

    let seen = |label: &str, distance: f32, crowd: u32| PerceivedSection {
        label: label.into(),
        distance,
        crowd_count: crowd,
    };

    let done = DecisionRequest {
        visible_sections: vec![seen("Dairy", 40.0, 0)],
        shopping_list: vec!["Dairy".into()],
        collected: vec!["Dairy".into()],
    };
    results.push(TestResult {
        name: "fallback_done_checks_out".into(),
        passed: fallback_decision(&done) == Decision::checkout(),
        detail: "complete list decides checkout".into(),
    });

    let crowded = DecisionRequest {
        visible_sections: vec![seen("Dairy", 30.0, 5), seen("Bakery", 90.0, 1)],
        shopping_list: vec!["Dairy".into(), "Bakery".into()],
        collected: vec![],
    };
    results.push(TestResult {
        name: "fallback_avoids_crowds".into(),
        passed: fallback_decision(&crowded) == Decision::product("Bakery"),
        detail: "less crowded needed section wins over nearer one".into(),
    });

    let blind = DecisionRequest {
        shopping_list: vec!["Dairy".into()],
        ..Default::default()
    };
    results.push(TestResult {
        name: "fallback_blind_checks_out".into(),
        passed: fallback_decision(&blind) == Decision::checkout(),
        detail: "nothing visible decides checkout".into(),
    });

    results
}

// ── 4. Congestion grid ──────────────────────────────────────────────────

fn validate_congestion(_verbose: bool) -> Vec<TestResult> {
    println!("--- Congestion Grid ---");
    let mut results = Vec::new();

    let mut grid = CongestionGrid::new();
    grid.rebuild(&[(10.0, 10.0), (12.0, 11.0), (14.0, 12.0), (120.0, 10.0)]);

    results.push(TestResult {
        name: "congestion_sum".into(),
        passed: grid.sum() == 4 && grid.occupied_cells() == 2,
        detail: format!("{} shoppers across {} cells", grid.sum(), grid.occupied_cells()),
    });
    results.push(TestResult {
        name: "congestion_average".into(),
        passed: (grid.average() - 2.0).abs() < 1e-6,
        detail: format!("mean occupancy {}", grid.average()),
    });
    results.push(TestResult {
        name: "congestion_bottlenecks".into(),
        passed: grid.bottlenecks() == vec![((0, 0), 3)],
        detail: format!("{:?}", grid.bottlenecks()),
    });

    results
}

// ── 5. End-to-end simulation ────────────────────────────────────────────

fn run_simulation(layout: &Layout, verbose: bool) -> Vec<TestResult> {
    println!("--- Simulation Run ---");
    let mut results = Vec::new();

    let config = SimConfig {
        max_agents: 8,
        rng_seed: Some(404),
        ..SimConfig::default()
    };
    let mut sim = Simulation::new();
    if let Err(e) = sim.start(layout.clone(), Arc::new(FallbackProvider), config) {
        results.push(TestResult {
            name: "sim_start".into(),
            passed: false,
            detail: format!("{}", e),
        });
        return results;
    }
    sim.run_until(2, 240.0, 0.5);

    let metrics = sim.metrics();
    if verbose {
        println!(
            "  t={:.1}s spawned={} completed={} avg_time={:.1}s",
            sim.sim_time(),
            metrics.total_customers,
            metrics.completed_customers,
            metrics.avg_shopping_time
        );
    }

    results.push(TestResult {
        name: "sim_spawns".into(),
        passed: metrics.total_customers > 0,
        detail: format!("{} shoppers spawned", metrics.total_customers),
    });
    results.push(TestResult {
        name: "sim_completes".into(),
        passed: metrics.completed_customers >= 1,
        detail: format!(
            "{} completed in {:.1}s",
            metrics.completed_customers,
            sim.sim_time()
        ),
    });
    results.push(TestResult {
        name: "sim_shopping_time".into(),
        passed: metrics.avg_shopping_time > 0.0
            && f64::from(metrics.avg_shopping_time) <= sim.sim_time(),
        detail: format!("avg shopping time {:.1}s", metrics.avg_shopping_time),
    });
    results.push(TestResult {
        name: "sim_congestion_accounts".into(),
        passed: metrics.congestion.sum() as usize == sim.active_agents(),
        detail: format!(
            "grid sum {} vs {} active",
            metrics.congestion.sum(),
            sim.active_agents()
        ),
    });

    let snapshot_json = sim.snapshot().to_json().unwrap_or_default();
    results.push(TestResult {
        name: "sim_snapshot_shape".into(),
        passed: snapshot_json.contains("\"totalCustomers\"")
            && snapshot_json.contains("\"congestionMap\""),
        detail: format!("{} bytes of snapshot JSON", snapshot_json.len()),
    });

    results
}

// ── 6. Optimizer ────────────────────────────────────────────────────────

fn run_optimizer(layout: &Layout, verbose: bool) -> Vec<TestResult> {
    println!("--- Optimizer ---");
    let mut results = Vec::new();

    let config = OptimizerConfig {
        population_size: 4,
        target_completed: 3,
        max_sim_time: 60.0,
        sim: SimConfig {
            max_agents: 6,
            ..SimConfig::default()
        },
        rng_seed: 99,
        ..OptimizerConfig::default()
    };
    let mut optimizer = match GeneticOptimizer::new(layout.clone(), config) {
        Ok(o) => o,
        Err(e) => {
            results.push(TestResult {
                name: "optimizer_new".into(),
                passed: false,
                detail: format!("{}", e),
            });
            return results;
        }
    };

    let mut generations = 0;
    let result = optimizer.optimize(2, |event| {
        generations += 1;
        if verbose {
            println!(
                "  gen {}: best {:.1}, mean {:.1}",
                event.generation, event.best_fitness, event.avg_fitness
            );
        }
    });

    results.push(TestResult {
        name: "optimizer_generations".into(),
        passed: result.generations_run == 2 && generations == 2,
        detail: format!("{} generations run", result.generations_run),
    });
    results.push(TestResult {
        name: "optimizer_scores".into(),
        passed: result.best_fitness > WORST_FITNESS,
        detail: format!("best fitness {:.1}", result.best_fitness),
    });

    let mut base_labels: Vec<&str> = layout.products.iter().map(|s| s.label.as_str()).collect();
    let mut best_labels: Vec<&str> = result
        .best_layout
        .products
        .iter()
        .map(|s| s.label.as_str())
        .collect();
    base_labels.sort_unstable();
    best_labels.sort_unstable();
    results.push(TestResult {
        name: "optimizer_keeps_assortment".into(),
        passed: base_labels == best_labels,
        detail: format!("{} product labels preserved", best_labels.len()),
    });

    results
}
