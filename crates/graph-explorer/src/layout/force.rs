//! Force-directed layout (Fruchterman-Reingold)
//!
//! Every pair of nodes repels with `k² / d` and every arc pulls its
//! endpoints together with `d² / k`, so two nodes joined by one arc settle
//! at distance `k`.
//!
//! Each iteration divides a node's net force by its local stiffness, giving
//! the step that would bring it to rest if its neighbors stood still, and
//! clamps that step to the viewport. The pass converges once the largest of
//! these pending steps drops below the threshold; it is checked before any
//! node moves, so a settled graph is left exactly where it is. Otherwise
//! every node advances by its step, capped by a temperature of its own:
//! halved when the step reverses direction, grown again while it keeps
//! pointing the same way.

use std::collections::HashSet;
use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, trace, warn};

use crate::core::{GraphStore, LayoutAlgorithm, LayoutReport, Point, Size, Viewport};

/// Cosine between consecutive steps below which a node is oscillating
const REVERSAL: f64 = -0.3;
/// Cosine between consecutive steps above which a node is still travelling
const ALIGNMENT: f64 = 0.7;

/// Constants of the force simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Target separation of two nodes joined by an arc, in pixels
    pub spring_length: f64,
    /// Upper bound on force iterations per pass
    pub max_iterations: usize,
    /// Convergence tolerance in pixels, compared against the largest
    /// per-node pending step (not the sum over all nodes)
    pub convergence_threshold: f64,
    /// Fraction of the pending step a node takes per iteration
    pub step_size: f64,
    /// Per-node displacement cap, as a fraction of the larger viewport side;
    /// also the ceiling the cap grows back to
    pub initial_temperature: f64,
    /// Multiplier applied to a node's cap when its step reverses
    pub cooling_factor: f64,
    /// Multiplier applied to a node's cap while its steps stay aligned
    pub heating_factor: f64,
    /// Distances below this count as coincident
    pub min_distance: f64,
    /// Seed for separating coincident nodes
    pub seed: u64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            spring_length: 120.0,
            max_iterations: 3000,
            convergence_threshold: 0.1,
            step_size: 1.0,
            initial_temperature: 0.1,
            cooling_factor: 0.5,
            heating_factor: 1.2,
            min_distance: 0.01,
            seed: 0x5EED,
        }
    }
}

impl ForceConfig {
    pub fn with_spring_length(mut self, spring_length: f64) -> Self {
        self.spring_length = spring_length;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Fruchterman-Reingold layout engine
#[derive(Debug, Clone, Default)]
pub struct ForceDirectedLayout {
    config: ForceConfig,
}

impl ForceDirectedLayout {
    /// Create an engine with the default constants
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }
}

impl LayoutAlgorithm for ForceDirectedLayout {
    fn layout(
        &self,
        store: &mut GraphStore,
        viewport: Viewport,
        locked: &HashSet<String>,
    ) -> LayoutReport {
        let span = info_span!(
            "force_layout",
            node_count = store.node_count(),
            arc_count = store.arc_count(),
            locked_count = locked.len()
        );
        let _enter = span.enter();

        if !viewport.is_valid() {
            warn!(
                width = viewport.width,
                height = viewport.height,
                "Skipping layout for invalid viewport"
            );
            return LayoutReport::idle();
        }

        let mut simulation = Simulation::from_store(store, locked);
        let movable = simulation.movable();
        if movable == 0 {
            debug!("No unlocked nodes, layout is a no-op");
            return LayoutReport::idle();
        }

        let report = simulation.run(&self.config, viewport);
        simulation.write_back(store);

        info!(
            iterations = report.iterations,
            movable = report.movable,
            max_displacement = report.max_displacement,
            converged = report.converged,
            "Layout completed"
        );
        report
    }

    fn name(&self) -> &'static str {
        "fruchterman-reingold"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}

/// Flat copy of the graph used for the duration of one pass
struct Simulation {
    positions: Vec<Point>,
    sizes: Vec<Size>,
    locked: Vec<bool>,
    /// Arc endpoints by node index, self-loops excluded
    springs: Vec<(usize, usize)>,
}

impl Simulation {
    fn from_store(store: &GraphStore, locked: &HashSet<String>) -> Self {
        let mut positions = Vec::with_capacity(store.node_count());
        let mut sizes = Vec::with_capacity(store.node_count());
        let mut is_locked = Vec::with_capacity(store.node_count());

        for node in store.nodes() {
            positions.push(node.position);
            sizes.push(node.size);
            is_locked.push(locked.contains(node.id()));
        }

        for id in locked {
            if !store.contains_node(id) {
                trace!(node_id = %id, "Ignoring unknown locked node");
            }
        }

        let springs = store
            .arcs()
            .filter(|arc| !arc.is_self_loop())
            .filter_map(|arc| {
                Some((
                    store.node_index(arc.source())?,
                    store.node_index(arc.destination())?,
                ))
            })
            .collect();

        Self {
            positions,
            sizes,
            locked: is_locked,
            springs,
        }
    }

    fn movable(&self) -> usize {
        self.locked.iter().filter(|locked| !**locked).count()
    }

    fn run(&mut self, config: &ForceConfig, viewport: Viewport) -> LayoutReport {
        let k = config.spring_length.max(config.min_distance);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let max_temperature = config.initial_temperature * viewport.width.max(viewport.height);

        let unlocked = self.unlocked();
        for &i in &unlocked {
            self.positions[i] = viewport.clamp_center(self.positions[i], self.sizes[i]);
        }

        let n = self.positions.len();
        let mut temperatures = vec![max_temperature; n];
        let mut previous: Vec<Option<Point>> = vec![None; n];
        let mut steps = vec![Point::ORIGIN; n];

        let mut report = LayoutReport {
            movable: unlocked.len(),
            ..LayoutReport::default()
        };

        while report.iterations < config.max_iterations {
            let (forces, stiffness) = self.forces(k, config.min_distance, &mut rng);
            report.iterations += 1;

            let mut max_displacement: f64 = 0.0;
            for &i in &unlocked {
                let raw = if stiffness[i] > 0.0 {
                    forces[i] * (config.step_size / stiffness[i])
                } else {
                    Point::ORIGIN
                };
                let target = viewport.clamp_center(self.positions[i] + raw, self.sizes[i]);
                steps[i] = target - self.positions[i];
                max_displacement = max_displacement.max(steps[i].length());
            }
            report.max_displacement = max_displacement;

            trace!(
                iteration = report.iterations,
                max_displacement,
                "Force iteration"
            );

            if max_displacement < config.convergence_threshold {
                report.converged = true;
                break;
            }

            for &i in &unlocked {
                let step = steps[i];
                if let Some(prev) = previous[i] {
                    let norms = step.length() * prev.length();
                    if norms > 0.0 {
                        let cosine = step.dot(prev) / norms;
                        if cosine < REVERSAL {
                            temperatures[i] *= config.cooling_factor;
                        } else if cosine > ALIGNMENT {
                            temperatures[i] =
                                (temperatures[i] * config.heating_factor).min(max_temperature);
                        }
                    }
                }
                previous[i] = Some(step);
                self.positions[i] = viewport
                    .clamp_center(self.positions[i] + step.capped(temperatures[i]), self.sizes[i]);
            }
        }

        if !report.converged {
            debug!(
                max_iterations = config.max_iterations,
                max_displacement = report.max_displacement,
                "Layout stopped at the iteration bound"
            );
        }
        report
    }

    /// Net force on every node for the current positions, and the diagonal
    /// stiffness used to turn it into a step
    fn forces(&self, k: f64, min_distance: f64, rng: &mut StdRng) -> (Vec<Point>, Vec<f64>) {
        let n = self.positions.len();
        let mut forces = vec![Point::ORIGIN; n];
        let mut stiffness = vec![0.0; n];

        for i in 0..n {
            for j in (i + 1)..n {
                if self.locked[i] && self.locked[j] {
                    continue;
                }

                let mut delta = self.positions[i] - self.positions[j];
                let mut distance = delta.length();
                if distance < min_distance {
                    let angle = rng.random::<f64>() * TAU;
                    delta = Point::new(angle.cos(), angle.sin()) * min_distance;
                    distance = min_distance;
                }

                // Unit vector times k²/d
                let push = delta * (k * k / (distance * distance));
                forces[i] += push;
                forces[j] -= push;

                // Bounded so that near-coincident nodes still take real steps
                let reach = distance.max(k);
                let soft = k * k / (reach * reach);
                stiffness[i] += soft;
                stiffness[j] += soft;
            }
        }

        for &(source, destination) in &self.springs {
            if self.locked[source] && self.locked[destination] {
                continue;
            }

            let delta = self.positions[destination] - self.positions[source];
            let distance = delta.length();
            if distance < min_distance {
                continue;
            }

            // Unit vector times d²/k
            let pull = delta * (distance / k);
            forces[source] += pull;
            forces[destination] -= pull;

            stiffness[source] += 2.0 * distance / k;
            stiffness[destination] += 2.0 * distance / k;
        }

        (forces, stiffness)
    }

    fn unlocked(&self) -> Vec<usize> {
        (0..self.locked.len()).filter(|&i| !self.locked[i]).collect()
    }

    fn write_back(&self, store: &mut GraphStore) {
        for ((node, position), locked) in store
            .nodes_mut()
            .zip(&self.positions)
            .zip(&self.locked)
        {
            if !locked {
                node.position = *position;
            }
        }
    }
}
