//! Procedural terrain height field
//!
//! The terrain is a fixed trigonometric surface. Every placed object and
//! every agent position is snapped onto it.

use glam::Vec3;
use serde::Serialize;

/// Horizontal frequency of the height field
const FREQUENCY: f32 = 0.2;

/// Peak height of the height field
const AMPLITUDE: f32 = 1.2;

/// Terrain elevation at planar coordinates (x, z)
///
/// Formula: sin(x * 0.2) * cos(z * 0.2) * 1.2
pub fn elevation(x: f32, z: f32) -> f32 {
    (x * FREQUENCY).sin() * (z * FREQUENCY).cos() * AMPLITUDE
}

/// Replace the vertical coordinate with the terrain elevation at (x, z)
pub fn snap_to_terrain(position: Vec3) -> Vec3 {
    Vec3::new(position.x, elevation(position.x, position.z), position.z)
}

/// A single elevation reading used in prompts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerrainSample {
    pub x: f32,
    pub z: f32,
    pub elevation: f32,
}

impl TerrainSample {
    pub fn at(x: f32, z: f32) -> Self {
        Self {
            x,
            z,
            elevation: elevation(x, z),
        }
    }

    /// Square grid of samples centred on `center`
    ///
    /// Covers [center - radius, center + radius] on both axes in `step`
    /// increments. A non-positive step yields only the centre sample.
    pub fn around(center: Vec3, radius: f32, step: f32) -> Vec<Self> {
        if !(step > 0.0) || radius < 0.0 {
            return vec![Self::at(center.x, center.z)];
        }

        let steps = (radius / step).floor() as i32;
        let mut samples = Vec::with_capacity(((2 * steps + 1) * (2 * steps + 1)) as usize);
        for dz in -steps..=steps {
            for dx in -steps..=steps {
                samples.push(Self::at(
                    center.x + dx as f32 * step,
                    center.z + dz as f32 * step,
                ));
            }
        }
        samples
    }
}
