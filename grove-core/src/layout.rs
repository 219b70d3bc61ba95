//! Canvas layout for fruits.
//!
//! Each minted fruit gets a fixed position inside an elliptical region
//! of the tree canvas. Placement is two-phase: a bounded number of
//! uniform random candidates that must clear every existing fruit by
//! `min_separation`, then a deterministic golden-angle spiral fallback
//! so allocation always terminates. Positions are assigned once and
//! never move.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Golden angle in radians, pi * (3 - sqrt(5)).
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// A point on the canvas, in the same units as [`PlacementSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The bounded elliptical region fruits are placed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacementSpace {
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,

    /// Minimum center-to-center distance between fruits.
    pub min_separation: f64,

    /// Radius of a rendered fruit; shrinks the sampling region so
    /// fruits never poke past the ellipse edge.
    pub object_radius: f64,
}

impl Default for PlacementSpace {
    fn default() -> Self {
        Self {
            width: 280.0,
            height: 200.0,
            center_x: 140.0,
            center_y: 110.0,
            min_separation: 34.0,
            object_radius: 16.0,
        }
    }
}

impl PlacementSpace {
    /// Horizontal semi-axis usable for fruit centers.
    fn semi_x(&self) -> f64 {
        (self.width / 2.0 - self.object_radius).max(0.0)
    }

    /// Vertical semi-axis usable for fruit centers.
    fn semi_y(&self) -> f64 {
        (self.height / 2.0 - self.object_radius).max(0.0)
    }

    /// Whether a fruit center lies within the usable ellipse.
    pub fn contains(&self, pos: &Position) -> bool {
        let (a, b) = (self.semi_x(), self.semi_y());
        if a <= 0.0 || b <= 0.0 {
            return pos.x == self.center_x && pos.y == self.center_y;
        }
        let nx = (pos.x - self.center_x) / a;
        let ny = (pos.y - self.center_y) / b;
        nx * nx + ny * ny <= 1.0 + 1e-9
    }
}

/// Allocate a position for the next fruit using the thread RNG.
pub fn allocate(space: &PlacementSpace, existing: &[Position], max_attempts: u32) -> Position {
    allocate_with_rng(space, existing, max_attempts, &mut rand::thread_rng())
}

/// Allocate with a specific RNG (useful for testing).
///
/// Phase 1 draws up to `max_attempts` candidates uniformly over the
/// ellipse (uniform angle, square-root radius for uniform areal
/// density) and accepts the first one at least `min_separation` from
/// every existing position. Phase 2 falls back to a golden-angle
/// spiral indexed by `existing.len()`, which always yields a position:
/// allocation never fails, it only relaxes the separation guarantee
/// when the canvas is packed beyond capacity.
pub fn allocate_with_rng<R: Rng>(
    space: &PlacementSpace,
    existing: &[Position],
    max_attempts: u32,
    rng: &mut R,
) -> Position {
    let (a, b) = (space.semi_x(), space.semi_y());

    if a > 0.0 && b > 0.0 {
        for _ in 0..max_attempts {
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let radius = rng.gen_range(0.0f64..=1.0).sqrt();
            let candidate = Position::new(
                space.center_x + radius * a * angle.cos(),
                space.center_y + radius * b * angle.sin(),
            );

            if is_acceptable(space, existing, &candidate) {
                return candidate;
            }
        }
    }

    let fallback = spiral_position(space, existing.len());
    tracing::debug!(
        occupied = existing.len(),
        max_attempts,
        x = fallback.x,
        y = fallback.y,
        "random placement exhausted, using spiral fallback"
    );
    fallback
}

fn is_acceptable(space: &PlacementSpace, existing: &[Position], candidate: &Position) -> bool {
    space.contains(candidate)
        && existing
            .iter()
            .all(|p| candidate.distance_to(p) >= space.min_separation)
}

/// Deterministic fallback position for the `index`-th fruit.
///
/// Golden-angle spiral: consecutive indices spread evenly around the
/// center instead of clustering, and the same index always maps to the
/// same position.
pub fn spiral_position(space: &PlacementSpace, index: usize) -> Position {
    let angle = index as f64 * GOLDEN_ANGLE;
    let spacing = space.min_separation * 0.6;

    // A circle bounded by the smaller semi-axis always fits inside
    // the ellipse, so a circular spiral is safe for any aspect ratio.
    let max_radius = space.semi_x().min(space.semi_y());
    let radius = ((index as f64).sqrt() * spacing).min(max_radius);

    Position::new(
        space.center_x + radius * angle.cos(),
        space.center_y + radius * angle.sin(),
    )
}
