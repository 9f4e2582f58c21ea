/*
    beat_bloom - An audio-reactive visualizer of grid simulations.
    Copyright (C) 2024  beat_bloom contributors

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

pub mod brain;
pub mod executor;
pub mod life;
pub mod reaction_diffusion;

use anyhow::Context;
use image::imageops::FilterType;
use rand::{rngs::StdRng, Rng};
use serde::Deserialize;

// A discrete-time grid simulation advanced one step per frame tick and
// reseeded on detected beats
pub trait GridSimulation {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    // Reinitialize the grids from the mask plus random blotch perturbation.
    // Safe to call at any time, including mid-simulation
    fn reseed(&mut self, mask: &SeedMask, rng: &mut StdRng);

    // Advance by exactly one time unit
    fn step(&mut self);

    // Write the current render scalar, each value in [0, 1], without mutating
    // simulation state
    fn sample(&self, out: &mut ScalarField);
}

// A row-major 2D field of scalars in [0, 1]
pub struct ScalarField {
    width: usize,
    height: usize,
    pub values: Vec<f32>,
}

impl ScalarField {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    // Match the field to a grid shape, keeping the allocation when it already fits
    pub fn reshape(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.values.resize(width * height, 0.);
        }
    }
}

// Grayscale seed image resampled to grid dimensions, values in [0, 1].
// Cells under non-white pixels are forced into the activated state on reseed
pub struct SeedMask {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl SeedMask {
    pub fn from_image(filepath: &str, width: usize, height: usize) -> anyhow::Result<Self> {
        let img = image::open(filepath)
            .with_context(|| format!("opening seed image `{filepath}`"))?;
        let gray = image::imageops::resize(
            &img.to_luma8(),
            width as u32,
            height as u32,
            FilterType::Triangle,
        );
        let values = gray.pixels().map(|p| f32::from(p.0[0]) / 255.).collect();
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), width * height);
        Self {
            width,
            height,
            values,
        }
    }

    fn is_active(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.values[y * self.width + x] < 1.
    }
}

// Ranges for the random perturbation applied on top of the seed mask
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedOptions {
    pub min_blotches: u32,
    pub max_blotches: u32,
    pub min_blotch_half_width: u32,
    pub max_blotch_half_width: u32,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            min_blotches: 5,
            max_blotches: 500,
            min_blotch_half_width: 3,
            max_blotch_half_width: 5,
        }
    }
}

// Activate every cell under a non-white mask region, then scatter a random
// number of square blotches at random positions. Blotches clamp at the grid
// edges rather than wrapping, unlike the update stencils
pub(crate) fn seed_activated_cells(
    mask: &SeedMask,
    options: &SeedOptions,
    rng: &mut StdRng,
    width: usize,
    height: usize,
    mut activate: impl FnMut(usize, usize),
) {
    for y in 0..height {
        for x in 0..width {
            if mask.is_active(x, y) {
                activate(x, y);
            }
        }
    }

    let max_blotches = options.max_blotches.max(options.min_blotches);
    let blotches = rng.gen_range(options.min_blotches..=max_blotches);
    for _ in 0..blotches {
        let cx = rng.gen_range(0..width);
        let cy = rng.gen_range(0..height);
        let max_half = options.max_blotch_half_width.max(options.min_blotch_half_width);
        let half = rng.gen_range(options.min_blotch_half_width..=max_half) as usize;

        for y in cy.saturating_sub(half)..(cy + half).min(height) {
            for x in cx.saturating_sub(half)..(cx + half).min(width) {
                activate(x, y);
            }
        }
    }
}

// Toroidal index steps shared by all the update stencils
#[inline]
pub(crate) fn wrap_dec(i: usize, n: usize) -> usize {
    if i == 0 {
        n - 1
    } else {
        i - 1
    }
}

#[inline]
pub(crate) fn wrap_inc(i: usize, n: usize) -> usize {
    if i + 1 == n {
        0
    } else {
        i + 1
    }
}

// Discrete 4-neighbor Laplacian with periodic wraparound, shared by both
// reaction-diffusion variants: -4*center plus the orthogonal neighbors
#[inline]
pub(crate) fn laplacian(grid: &[f32], width: usize, height: usize, x: usize, y: usize) -> f32 {
    let row = y * width;
    let center = grid[row + x];
    let left = grid[row + wrap_dec(x, width)];
    let right = grid[row + wrap_inc(x, width)];
    let up = grid[wrap_dec(y, height) * width + x];
    let down = grid[wrap_inc(y, height) * width + x];
    -4. * center + left + right + up + down
}

// Count of cells in the given state within the wraparound Moore neighborhood
#[inline]
pub(crate) fn moore_neighbors(
    grid: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    state: u8,
) -> u8 {
    let xl = wrap_dec(x, width);
    let xr = wrap_inc(x, width);
    let yu = wrap_dec(y, height) * width;
    let yd = wrap_inc(y, height) * width;
    let yc = y * width;

    let neighbors = [
        grid[yu + xl],
        grid[yu + x],
        grid[yu + xr],
        grid[yc + xl],
        grid[yc + xr],
        grid[yd + xl],
        grid[yd + x],
        grid[yd + xr],
    ];
    neighbors.iter().filter(|&&cell| cell == state).count() as u8
}
