use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tidewalk_locomotion::GroundProbe;

/// Errors from terrain snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot has {got} heights, expected {expected} for size {size}")]
    DimensionMismatch {
        size: usize,
        expected: usize,
        got: usize,
    },
    #[error("snapshot grid size {0} is below the minimum of 2 vertices per side")]
    DegenerateGrid(usize),
}

/// JSON structure for a terrain snapshot file.
#[derive(Serialize, Deserialize)]
struct SnapshotJson {
    size: usize,
    extent: f32,
    seed: u32,
    heights: Vec<f32>,
}

/// A square heightfield: N x N vertices over world XZ `[-extent, extent]^2`.
pub struct Heightfield {
    pub size: usize,
    pub extent: f32,
    pub seed: u32,
    pub heights: Vec<f32>,
    pub normals: Vec<Vec3>,
}

impl Heightfield {
    /// Generate a deterministic island heightfield.
    ///
    /// Three octaves of seeded value noise, with a radial falloff that sinks
    /// the rim below the water line so the walkable area reads as a shore.
    pub fn generate(size: usize, extent: f32, seed: u32) -> Self {
        let n = size.max(2);
        let mut heights = vec![0.0f32; n * n];
        for z in 0..n {
            for x in 0..n {
                let fx = (x as f32 / (n as f32 - 1.0)) * 2.0 - 1.0;
                let fz = (z as f32 / (n as f32 - 1.0)) * 2.0 - 1.0;
                let wx = fx * extent;
                let wz = fz * extent;

                let mut h = 0.0;
                let mut amp = 3.2;
                let mut freq = 0.035;
                for octave in 0..3 {
                    h += amp * value_noise_2d(wx * freq, wz * freq, seed.wrapping_add(octave));
                    amp *= 0.45;
                    freq *= 2.1;
                }
                // Radial falloff: rim drops well below the water level.
                let r = (fx * fx + fz * fz).sqrt().min(1.0);
                h = h * (1.0 - r * r) - 3.0 * r * r;
                heights[z * n + x] = h;
            }
        }
        let normals = compute_normals(n, extent, &heights);
        tracing::debug!(size = n, extent, seed, "generated heightfield");
        Self {
            size: n,
            extent,
            seed,
            heights,
            normals,
        }
    }

    /// Bilinear height at world (x, z), or `None` outside the extent.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if x.abs() > self.extent || z.abs() > self.extent || !x.is_finite() || !z.is_finite() {
            return None;
        }
        let n = self.size;
        let gx = ((x / self.extent) * 0.5 + 0.5) * (n as f32 - 1.0);
        let gz = ((z / self.extent) * 0.5 + 0.5) * (n as f32 - 1.0);
        let x0 = (gx.floor() as usize).min(n - 1);
        let z0 = (gz.floor() as usize).min(n - 1);
        let x1 = (x0 + 1).min(n - 1);
        let z1 = (z0 + 1).min(n - 1);
        let tx = (gx - x0 as f32).clamp(0.0, 1.0);
        let tz = (gz - z0 as f32).clamp(0.0, 1.0);

        let h00 = self.heights[z0 * n + x0];
        let h10 = self.heights[z0 * n + x1];
        let h01 = self.heights[z1 * n + x0];
        let h11 = self.heights[z1 * n + x1];
        let h0 = h00 * (1.0 - tx) + h10 * tx;
        let h1 = h01 * (1.0 - tx) + h11 * tx;
        Some(h0 * (1.0 - tz) + h1 * tz)
    }

    /// Interpolated surface normal at world (x, z). Falls back to +Y outside.
    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        if x.abs() > self.extent || z.abs() > self.extent {
            return Vec3::Y;
        }
        let n = self.size;
        let gx = ((x / self.extent) * 0.5 + 0.5) * (n as f32 - 1.0);
        let gz = ((z / self.extent) * 0.5 + 0.5) * (n as f32 - 1.0);
        let x0 = (gx.floor() as usize).min(n - 1);
        let z0 = (gz.floor() as usize).min(n - 1);
        let x1 = (x0 + 1).min(n - 1);
        let z1 = (z0 + 1).min(n - 1);
        let tx = (gx - x0 as f32).clamp(0.0, 1.0);
        let tz = (gz - z0 as f32).clamp(0.0, 1.0);

        let n0 = self.normals[z0 * n + x0].lerp(self.normals[z0 * n + x1], tx);
        let n1 = self.normals[z1 * n + x0].lerp(self.normals[z1 * n + x1], tx);
        n0.lerp(n1, tz).normalize_or(Vec3::Y)
    }

    /// World-space position of grid vertex (x, z).
    pub fn vertex(&self, x: usize, z: usize) -> Vec3 {
        let n = self.size as f32 - 1.0;
        Vec3::new(
            (x as f32 / n * 2.0 - 1.0) * self.extent,
            self.heights[z * self.size + x],
            (z as f32 / n * 2.0 - 1.0) * self.extent,
        )
    }

    /// Write a JSON snapshot.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TerrainError> {
        let snap = SnapshotJson {
            size: self.size,
            extent: self.extent,
            seed: self.seed,
            heights: self.heights.clone(),
        };
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer(file, &snap)?;
        Ok(())
    }

    /// Load a JSON snapshot, recomputing normals.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let file = std::fs::File::open(path.as_ref())?;
        let snap: SnapshotJson = serde_json::from_reader(file)?;
        // Sampling assumes at least one grid cell, like generate's floor.
        if snap.size < 2 {
            return Err(TerrainError::DegenerateGrid(snap.size));
        }
        let expected = snap.size * snap.size;
        if snap.heights.len() != expected {
            return Err(TerrainError::DimensionMismatch {
                size: snap.size,
                expected,
                got: snap.heights.len(),
            });
        }
        let normals = compute_normals(snap.size, snap.extent, &snap.heights);
        tracing::info!(size = snap.size, extent = snap.extent, "loaded terrain snapshot");
        Ok(Self {
            size: snap.size,
            extent: snap.extent,
            seed: snap.seed,
            heights: snap.heights,
            normals,
        })
    }
}

impl GroundProbe for Heightfield {
    fn probe(&self, origin: Vec3) -> Option<f32> {
        self.height_at(origin.x, origin.z)
    }
}

/// Central-difference normals over the grid.
fn compute_normals(size: usize, extent: f32, heights: &[f32]) -> Vec<Vec3> {
    let n = size;
    let cell = 2.0 * extent / (n as f32 - 1.0);
    let mut normals = vec![Vec3::Y; n * n];
    let h = |x: usize, z: usize| heights[z * n + x];
    for z in 0..n {
        for x in 0..n {
            let xl = h(x.saturating_sub(1), z);
            let xr = h((x + 1).min(n - 1), z);
            let zd = h(x, z.saturating_sub(1));
            let zu = h(x, (z + 1).min(n - 1));
            let dx = (xr - xl) / (2.0 * cell);
            let dz = (zu - zd) / (2.0 * cell);
            normals[z * n + x] = Vec3::new(-dx, 1.0, -dz).normalize_or(Vec3::Y);
        }
    }
    normals
}

// Deterministic value noise, seeded per lattice point.

fn hash_lattice(i: i32, j: i32, seed: u32) -> f32 {
    let mut state = (i as u64 & 0xffff_ffff) | ((j as u64) << 32);
    state ^= (seed as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    state = splitmix64(state);
    // Map to [-1, 1]
    (state >> 40) as f32 / ((1u64 << 24) as f32) * 2.0 - 1.0
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn value_noise_2d(x: f32, y: f32, seed: u32) -> f32 {
    let p = Vec2::new(x, y);
    let i = p.floor();
    let f = p - i;
    // Smoothstep interpolation between lattice values.
    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);
    let (ix, iy) = (i.x as i32, i.y as i32);
    let a = hash_lattice(ix, iy, seed);
    let b = hash_lattice(ix + 1, iy, seed);
    let c = hash_lattice(ix, iy + 1, seed);
    let d = hash_lattice(ix + 1, iy + 1, seed);
    let ab = a * (1.0 - u.x) + b * u.x;
    let cd = c * (1.0 - u.x) + d * u.x;
    ab * (1.0 - u.y) + cd * u.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let a = Heightfield::generate(33, 50.0, 7);
        let b = Heightfield::generate(33, 50.0, 7);
        assert_eq!(a.heights, b.heights);
    }

    #[test]
    fn different_seeds_differ() {
        let a = Heightfield::generate(33, 50.0, 1);
        let b = Heightfield::generate(33, 50.0, 2);
        assert_ne!(a.heights, b.heights);
    }

    #[test]
    fn sampling_outside_extent_misses() {
        let hf = Heightfield::generate(33, 50.0, 7);
        assert!(hf.height_at(50.1, 0.0).is_none());
        assert!(hf.height_at(0.0, -51.0).is_none());
        assert!(hf.height_at(f32::NAN, 0.0).is_none());
        assert!(hf.height_at(0.0, 0.0).is_some());
    }

    #[test]
    fn sampling_at_grid_vertices_is_exact() {
        let hf = Heightfield::generate(17, 10.0, 3);
        for z in 0..hf.size {
            for x in 0..hf.size {
                let v = hf.vertex(x, z);
                let h = hf.height_at(v.x, v.z).unwrap();
                assert!((h - v.y).abs() < 1e-4, "vertex ({x},{z})");
            }
        }
    }

    #[test]
    fn bilinear_sample_is_bounded_by_corners() {
        let hf = Heightfield::generate(17, 10.0, 3);
        let h = hf.height_at(0.3, 0.7).unwrap();
        let min = hf.heights.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = hf.heights.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(h >= min && h <= max);
    }

    #[test]
    fn normals_are_unit_length() {
        let hf = Heightfield::generate(33, 50.0, 7);
        for n in &hf.normals {
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn probe_goes_through_height_at() {
        let hf = Heightfield::generate(33, 50.0, 7);
        let origin = Vec3::new(1.0, 25.0, -2.0);
        assert_eq!(hf.probe(origin), hf.height_at(1.0, -2.0));
        assert_eq!(hf.probe(Vec3::new(200.0, 0.0, 0.0)), None);
    }

    #[test]
    fn snapshot_round_trip() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let hf = Heightfield::generate(17, 25.0, 11);
        hf.save(tmp.path()).unwrap();

        let loaded = Heightfield::load(tmp.path()).unwrap();
        assert_eq!(loaded.size, hf.size);
        assert_eq!(loaded.extent, hf.extent);
        assert_eq!(loaded.heights, hf.heights);
    }

    #[test]
    fn snapshot_dimension_mismatch_is_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let bad = SnapshotJson {
            size: 4,
            extent: 10.0,
            seed: 0,
            heights: vec![0.0; 7],
        };
        serde_json::to_writer(std::fs::File::create(tmp.path()).unwrap(), &bad).unwrap();
        assert!(matches!(
            Heightfield::load(tmp.path()),
            Err(TerrainError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn snapshot_with_degenerate_grid_is_rejected() {
        for size in [0usize, 1] {
            let tmp = tempfile::NamedTempFile::new().unwrap();
            let bad = SnapshotJson {
                size,
                extent: 10.0,
                seed: 0,
                heights: vec![0.0; size * size],
            };
            serde_json::to_writer(std::fs::File::create(tmp.path()).unwrap(), &bad).unwrap();
            assert!(matches!(
                Heightfield::load(tmp.path()),
                Err(TerrainError::DegenerateGrid(s)) if s == size
            ));
        }
    }
}
