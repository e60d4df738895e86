//! Genetic optimizer - searches layout variants for low congestion and
//! short shopping times.
//!
//! Each generation scores every population member with a full simulator
//! run. Members are independent, so they are evaluated in parallel;
//! every evaluation gets its own simulator, metrics, decision cache,
//! and a seeded RNG stream derived from (seed, generation, member),
//! which keeps results deterministic regardless of thread scheduling.

use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::engine::{SimConfig, Simulation, StartError};
use crate::provider::{DecisionProvider, FallbackProvider};
use shopflow_logic::constants::{MIN_SECTION_HEIGHT, MIN_SECTION_WIDTH};
use shopflow_logic::fitness::{FitnessWeights, WORST_FITNESS};
use shopflow_logic::layout::{has_errors, validate_layout, Layout};

/// Optimizer tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub population_size: usize,
    /// Fraction of the population retained unmodified each generation.
    pub elite_fraction: f32,
    /// Probability that a crossover child is mutated.
    pub mutation_rate: f64,
    pub weights: FitnessWeights,
    /// An evaluation run ends once this many shoppers have finished...
    pub target_completed: u32,
    /// ...or this much simulated time has elapsed.
    pub max_sim_time: f64,
    /// Tick size used for evaluation runs.
    pub step_dt: f32,
    /// Simulator configuration applied to every evaluation.
    pub sim: SimConfig,
    /// Seed for variant generation and per-member evaluation streams.
    pub rng_seed: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 12,
            elite_fraction: 0.3,
            mutation_rate: 0.2,
            weights: FitnessWeights::default(),
            target_completed: 30,
            max_sim_time: 300.0,
            step_dt: 0.5,
            sim: SimConfig::default(),
            rng_seed: 0,
        }
    }
}

/// Per-generation progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub generation: usize,
    /// Best fitness seen so far across the whole run.
    pub best_fitness: f32,
    pub best_layout: Layout,
    /// Mean fitness of the current generation.
    pub avg_fitness: f32,
}

/// Outcome of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizeResult {
    pub best_layout: Layout,
    pub best_fitness: f32,
    pub generations_run: usize,
}

/// Cloneable cancellation handle, observed at generation boundaries.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Population-based layout search.
pub struct GeneticOptimizer {
    base: Layout,
    config: OptimizerConfig,
    provider: Arc<dyn DecisionProvider>,
    stop: StopHandle,
    rng: SmallRng,
}

impl GeneticOptimizer {
    /// Build an optimizer around a validated base layout.
    pub fn new(base: Layout, config: OptimizerConfig) -> Result<Self, StartError> {
        let issues = validate_layout(&base);
        if has_errors(&issues) {
            return Err(StartError { issues });
        }
        let rng = SmallRng::seed_from_u64(config.rng_seed);
        Ok(Self {
            base,
            config,
            provider: Arc::new(FallbackProvider),
            stop: StopHandle::default(),
            rng,
        })
    }

    /// Use a custom decision provider for evaluation runs.
    pub fn with_provider(mut self, provider: Arc<dyn DecisionProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Handle for cancelling the run from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run up to `max_generations`, invoking `on_progress` once per
    /// generation. Cancellation returns the best-so-far result.
    pub fn optimize(
        &mut self,
        max_generations: usize,
        mut on_progress: impl FnMut(&ProgressEvent),
    ) -> OptimizeResult {
        let mut population = self.initial_population();
        let mut best_layout = self.base.clone();
        let mut best_fitness = WORST_FITNESS;
        let mut generations_run = 0;

        for generation in 0..max_generations {
            if self.stop.is_stopped() {
                break;
            }

            let config = &self.config;
            let provider = &self.provider;
            let fitness: Vec<f32> = population
                .par_iter()
                .enumerate()
                .map(|(member, layout)| {
                    evaluate_member(
                        layout,
                        config,
                        provider.clone(),
                        member_seed(config.rng_seed, generation, member),
                    )
                })
                .collect();
            generations_run = generation + 1;

            // Elitism: the retained best never regresses.
            for (member, &score) in fitness.iter().enumerate() {
                if score > best_fitness {
                    best_fitness = score;
                    best_layout = population[member].clone();
                }
            }
            let avg_fitness = fitness.iter().sum::<f32>() / fitness.len().max(1) as f32;

            info!(
                "generation {generation}: best {best_fitness:.1}, mean {avg_fitness:.1}"
            );
            on_progress(&ProgressEvent {
                generation,
                best_fitness,
                best_layout: best_layout.clone(),
                avg_fitness,
            });

            if generation + 1 < max_generations {
                population = self.breed(population, &fitness);
            }
        }

        OptimizeResult {
            best_layout,
            best_fitness,
            generations_run,
        }
    }

    /// The original layout plus randomly disturbed variants.
    fn initial_population(&mut self) -> Vec<Layout> {
        let size = self.config.population_size.max(1);
        let mut population = Vec::with_capacity(size);
        population.push(self.base.clone());
        while population.len() < size {
            let variant = initial_variant(&self.base, &mut self.rng);
            population.push(variant);
        }
        population
    }

    /// Selection, crossover, and mutation into the next generation.
    fn breed(&mut self, population: Vec<Layout>, fitness: &[f32]) -> Vec<Layout> {
        let size = self.config.population_size.max(1);
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

        let survivor_count = ((self.config.elite_fraction * population.len() as f32).ceil()
            as usize)
            .clamp(1, population.len());
        let survivors: Vec<Layout> = order[..survivor_count]
            .iter()
            .map(|&i| population[i].clone())
            .collect();

        let mut next = survivors.clone();
        while next.len() < size {
            let a = &survivors[self.rng.gen_range(0..survivors.len())];
            let b = &survivors[self.rng.gen_range(0..survivors.len())];
            let mut child = crossover(a, b, &mut self.rng);
            if self.rng.gen_bool(self.config.mutation_rate) {
                mutate(&mut child, &mut self.rng);
            }
            next.push(child);
        }
        next
    }
}

/// Score one layout with a full simulator run. Any failure scores worst
/// instead of aborting the generation.
fn evaluate_member(
    layout: &Layout,
    config: &OptimizerConfig,
    provider: Arc<dyn DecisionProvider>,
    seed: u64,
) -> f32 {
    let sim_config = SimConfig {
        rng_seed: Some(seed),
        ..config.sim.clone()
    };
    let mut sim = Simulation::new();
    // Cached decisions from one member must never answer for another.
    sim.isolate_decision_cache();
    if sim.start(layout.clone(), provider, sim_config).is_err() {
        return WORST_FITNESS;
    }
    sim.run_until(config.target_completed, config.max_sim_time, config.step_dt);
    let metrics = sim.metrics();
    config.weights.score(
        metrics.avg_congestion(),
        metrics.bottleneck_count() as u32,
        metrics.avg_shopping_time,
    )
}

/// Deterministic per-member RNG seed (splitmix-style finalizer).
fn member_seed(base: u64, generation: usize, member: usize) -> u64 {
    let mut h = base
        .wrapping_add((generation as u64) << 32)
        .wrapping_add(member as u64)
        .wrapping_mul(0x9E3779B97F4A7C15);
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58476D1CE4E5B9);
    h ^= h >> 27;
    h
}

/// A disturbed copy of the base layout: product positions permuted,
/// checkouts jittered up to ±50, and 30% of sections resized.
fn initial_variant(base: &Layout, rng: &mut SmallRng) -> Layout {
    let mut variant = base.clone();

    let mut slots: Vec<(f32, f32)> = variant.products.iter().map(|s| (s.x, s.y)).collect();
    for i in (1..slots.len()).rev() {
        slots.swap(i, rng.gen_range(0..=i));
    }
    for (section, (x, y)) in variant.products.iter_mut().zip(slots) {
        section.x = x;
        section.y = y;
    }

    for checkout in &mut variant.checkouts {
        checkout.x += rng.gen_range(-50.0..=50.0);
        checkout.y += rng.gen_range(-50.0..=50.0);
    }

    for section in &mut variant.products {
        if rng.gen_bool(0.3) {
            section.width = (section.width + rng.gen_range(-20.0..=20.0)).max(MIN_SECTION_WIDTH);
            section.height = (section.height + rng.gen_range(-15.0..=15.0)).max(MIN_SECTION_HEIGHT);
        }
    }
    variant
}

/// Copy `a`, splice in `b`'s product positions from a random split index
/// onward, and inherit each checkout from either parent at 50%.
fn crossover(a: &Layout, b: &Layout, rng: &mut SmallRng) -> Layout {
    let mut child = a.clone();

    let sections = child.products.len().min(b.products.len());
    if sections > 0 {
        let split = rng.gen_range(0..sections);
        for i in split..sections {
            child.products[i].x = b.products[i].x;
            child.products[i].y = b.products[i].y;
        }
    }

    let checkouts = child.checkouts.len().min(b.checkouts.len());
    for i in 0..checkouts {
        if rng.gen_bool(0.5) {
            child.checkouts[i] = b.checkouts[i];
        }
    }
    child
}

/// Apply one random mutation, occasionally two.
fn mutate(layout: &mut Layout, rng: &mut SmallRng) {
    let op = rng.gen_range(0..3);
    apply_mutation(layout, op, rng);
    if rng.gen_bool(0.3) {
        let op = rng.gen_range(0..3);
        apply_mutation(layout, op, rng);
    }
}

fn apply_mutation(layout: &mut Layout, op: u32, rng: &mut SmallRng) {
    match op {
        // Swap two sections' positions.
        0 => {
            if layout.products.len() >= 2 {
                let i = rng.gen_range(0..layout.products.len());
                let mut j = rng.gen_range(0..layout.products.len() - 1);
                if j >= i {
                    j += 1;
                }
                let (ix, iy) = (layout.products[i].x, layout.products[i].y);
                let (jx, jy) = (layout.products[j].x, layout.products[j].y);
                layout.products[i].x = jx;
                layout.products[i].y = jy;
                layout.products[j].x = ix;
                layout.products[j].y = iy;
            }
        }
        // Jitter one checkout.
        1 => {
            if !layout.checkouts.is_empty() {
                let i = rng.gen_range(0..layout.checkouts.len());
                layout.checkouts[i].x += rng.gen_range(-50.0..=50.0);
                layout.checkouts[i].y += rng.gen_range(-25.0..=25.0);
            }
        }
        // Resize one section, floored at the minimum footprint.
        _ => {
            if !layout.products.is_empty() {
                let i = rng.gen_range(0..layout.products.len());
                let section = &mut layout.products[i];
                section.width = (section.width + rng.gen_range(-40.0..=40.0)).max(MIN_SECTION_WIDTH);
                section.height =
                    (section.height + rng.gen_range(-30.0..=30.0)).max(MIN_SECTION_HEIGHT);
            }
        }
    }
}
