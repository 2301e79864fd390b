//! # Field of View
//!
//! Recursive shadowcasting over the floor's tile grid.
//!
//! Each computation replaces the floor's `visible` mask and accumulates
//! into the monotonic `explored` mask: once a tile has been seen it stays
//! explored forever. The engine runs on every player move and on floor
//! entry.

use crate::config;
use crate::game::{Floor, Position};
use serde::{Deserialize, Serialize};

/// Field-of-view parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FovConfig {
    /// Visibility radius in tiles
    pub radius: i32,
    /// Whether opaque tiles at the edge of sight are themselves lit
    pub light_walls: bool,
}

impl Default for FovConfig {
    fn default() -> Self {
        Self {
            radius: config::DEFAULT_FOV_RADIUS,
            light_walls: true,
        }
    }
}

/// Octant transforms for the eight 45-degree sectors.
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, 1],
    [0, 1, 1, 0],
    [0, -1, 1, 0],
    [-1, 0, 0, 1],
    [-1, 0, 0, -1],
    [0, -1, -1, 0],
    [0, 1, -1, 0],
    [1, 0, 0, -1],
];

/// Computes the visible-tile set from `origin`, replacing the floor's
/// current visibility mask and extending its explored mask.
pub fn compute_fov(floor: &mut Floor, origin: Position, fov: &FovConfig) {
    floor.clear_visible();

    if let Some(tile) = floor.tile_mut(origin) {
        tile.set_visible(true);
    }

    for octant in OCTANTS {
        cast_light(floor, origin, fov, 1, 1.0, 0.0, octant);
    }
}

/// Recursively scans one octant between two slopes.
fn cast_light(
    floor: &mut Floor,
    origin: Position,
    fov: &FovConfig,
    row: i32,
    mut start_slope: f64,
    end_slope: f64,
    octant: [i32; 4],
) {
    if start_slope < end_slope {
        return;
    }
    let [xx, xy, yx, yy] = octant;
    let radius_sq = fov.radius * fov.radius;

    let mut blocked = false;
    let mut new_start = start_slope;
    for distance in row..=fov.radius {
        if blocked {
            break;
        }
        let dy = -distance;
        for dx in -distance..=0 {
            let pos = Position::new(
                origin.x + dx * xx + dy * xy,
                origin.y + dx * yx + dy * yy,
            );
            let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
            let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

            if start_slope < right_slope {
                continue;
            }
            if end_slope > left_slope {
                break;
            }

            if dx * dx + dy * dy <= radius_sq {
                let opaque = floor.is_opaque(pos);
                if (!opaque || fov.light_walls) && floor.in_bounds(pos) {
                    if let Some(tile) = floor.tile_mut(pos) {
                        tile.set_visible(true);
                    }
                }
            }

            if blocked {
                if floor.is_opaque(pos) {
                    new_start = right_slope;
                } else {
                    blocked = false;
                    start_slope = new_start;
                }
            } else if floor.is_opaque(pos) && distance < fov.radius {
                blocked = true;
                cast_light(
                    floor,
                    origin,
                    fov,
                    distance + 1,
                    start_slope,
                    left_slope,
                    octant,
                );
                new_start = right_slope;
            }
        }
    }
}
