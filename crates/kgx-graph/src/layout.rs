//! Seeded force-directed layout.
//!
//! Fruchterman-Reingold with a linearly cooling step size. Initial
//! positions come from an `StdRng` seeded per computation, so identical
//! topology and seed give identical coordinates. Final positions are
//! centred and scaled into [-1, 1].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kgx_core::{KgError, LayoutConfig, Result};

use crate::graph::EntityGraph;

/// 2-D node position
pub type Position = [f64; 2];

/// Minimum distance between two nodes when computing forces
const MIN_DISTANCE: f64 = 0.01;

/// Spring layout parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SpringLayout {
    /// Number of cooling iterations
    pub iterations: usize,
    /// Seed for the initial positions
    pub seed: u64,
}

impl SpringLayout {
    pub fn new(iterations: usize, seed: u64) -> Self {
        Self { iterations, seed }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.iterations, config.seed)
    }

    /// Compute one position per node, in node order
    pub fn compute(&self, graph: &EntityGraph) -> Result<Vec<Position>> {
        let n = graph.node_count();
        match n {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![[0.0, 0.0]]),
            _ => {}
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<Position> = (0..n).map(|_| [rng.gen(), rng.gen()]).collect();
        let adjacent = graph.adjacency_matrix();

        // Optimal pairwise distance for a unit area
        let k = (1.0 / n as f64).sqrt();
        let mut temperature = extent(&pos) * 0.1;
        let cooling = temperature / (self.iterations as f64 + 1.0);

        for _ in 0..self.iterations {
            let mut displacement = vec![[0.0_f64; 2]; n];

            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i][0] - pos[j][0];
                    let dy = pos[i][1] - pos[j][1];
                    let distance = dx.hypot(dy).max(MIN_DISTANCE);
                    let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                    let force = k * k / (distance * distance) - attraction;
                    displacement[i][0] += dx * force;
                    displacement[i][1] += dy * force;
                }
            }

            for (p, d) in pos.iter_mut().zip(&displacement) {
                let mut length = d[0].hypot(d[1]);
                if length < MIN_DISTANCE {
                    length = 0.1;
                }
                p[0] += d[0] * temperature / length;
                p[1] += d[1] * temperature / length;
            }

            temperature -= cooling;
        }

        rescale(&mut pos);

        if pos.iter().flatten().any(|c| !c.is_finite()) {
            return Err(KgError::LayoutError(
                "spring layout produced non-finite coordinates".to_string(),
            ));
        }
        Ok(pos)
    }
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

/// Widest spread of the positions along either axis
fn extent(pos: &[Position]) -> f64 {
    (0..2)
        .map(|axis| {
            let (min, max) = pos.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
            max - min
        })
        .fold(0.0, f64::max)
}

/// Centre on the origin and scale the largest coordinate to 1
fn rescale(pos: &mut [Position]) {
    let n = pos.len() as f64;
    for axis in 0..2 {
        let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[axis] -= mean;
        }
    }

    let limit = pos.iter().flatten().fold(0.0_f64, |acc, c| acc.max(c.abs()));
    if limit > 0.0 {
        for c in pos.iter_mut().flatten() {
            *c /= limit;
        }
    }
}
