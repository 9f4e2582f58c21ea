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

use rand::{rngs::StdRng, Rng};
use serde::Deserialize;

use super::{laplacian, seed_activated_cells, GridSimulation, ScalarField, SeedMask, SeedOptions};

#[derive(Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrayScottParams {
    pub diffusion_a: f32,
    pub diffusion_b: f32,
    pub feed: f32,
    pub kill: f32,
}

impl Default for GrayScottParams {
    fn default() -> Self {
        Self {
            diffusion_a: 0.07,
            diffusion_b: 0.13,
            feed: 0.055,
            kill: 0.062,
        }
    }
}

// Two coupled concentrations: A is fed and consumed by the reaction, B is
// produced by it and killed off. Spot and maze patterns emerge from the
// feed/kill balance
pub struct GrayScott {
    width: usize,
    height: usize,
    a: Vec<f32>,
    b: Vec<f32>,
    a_next: Vec<f32>,
    b_next: Vec<f32>,
    params: GrayScottParams,
    seed: SeedOptions,
}

impl GrayScott {
    pub fn new(width: usize, height: usize, params: GrayScottParams, seed: SeedOptions) -> Self {
        let cells = width * height;
        Self {
            width,
            height,
            a: vec![1.; cells],
            b: vec![0.; cells],
            a_next: vec![0.; cells],
            b_next: vec![0.; cells],
            params,
            seed,
        }
    }
}

impl GridSimulation for GrayScott {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn reseed(&mut self, mask: &SeedMask, rng: &mut StdRng) {
        self.a.fill(1.);
        self.b.fill(0.);
        let (b, width) = (&mut self.b, self.width);
        seed_activated_cells(mask, &self.seed, rng, self.width, self.height, |x, y| {
            b[y * width + x] = 1.;
        });
    }

    fn step(&mut self) {
        let p = self.params;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                let a = self.a[i];
                let b = self.b[i];
                let lap_a = laplacian(&self.a, self.width, self.height, x, y);
                let lap_b = laplacian(&self.b, self.width, self.height, x, y);
                let reaction = a * b * b;

                self.a_next[i] =
                    (a + p.diffusion_a * lap_a - reaction + p.feed * (1. - a)).clamp(0., 1.);
                self.b_next[i] =
                    (b + p.diffusion_b * lap_b + reaction - (p.kill + p.feed) * b).clamp(0., 1.);
            }
        }
        std::mem::swap(&mut self.a, &mut self.a_next);
        std::mem::swap(&mut self.b, &mut self.b_next);
    }

    // Where B has displaced A the sample goes dark, tracing the active fronts
    fn sample(&self, out: &mut ScalarField) {
        out.reshape(self.width, self.height);
        for (value, (a, b)) in out.values.iter_mut().zip(self.a.iter().zip(&self.b)) {
            *value = (a - b).clamp(0., 1.);
        }
    }
}

#[derive(Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitzHughNagumoParams {
    pub diffusion_u: f32,
    pub diffusion_v: f32,
    pub epsilon: f32,
    pub gamma: f32,
    pub drive: f32,
    pub time_scale: f32,
    // Fraction of cells sprinkled with a half-activated recovery value on reseed
    pub sprinkle_fraction: f32,
}

impl Default for FitzHughNagumoParams {
    fn default() -> Self {
        Self {
            diffusion_u: 0.07,
            diffusion_v: 0.13,
            epsilon: 0.1,
            gamma: 1.,
            drive: 0.5,
            time_scale: 1.,
            sprinkle_fraction: 0.02,
        }
    }
}

// Excitable-medium kinetics over the same Laplacian primitive as Gray-Scott;
// produces travelling stripes and spirals rather than spots
pub struct FitzHughNagumo {
    width: usize,
    height: usize,
    u: Vec<f32>,
    v: Vec<f32>,
    u_next: Vec<f32>,
    v_next: Vec<f32>,
    params: FitzHughNagumoParams,
    seed: SeedOptions,
}

impl FitzHughNagumo {
    pub fn new(
        width: usize,
        height: usize,
        params: FitzHughNagumoParams,
        seed: SeedOptions,
    ) -> Self {
        let cells = width * height;
        Self {
            width,
            height,
            u: vec![1.; cells],
            v: vec![0.; cells],
            u_next: vec![0.; cells],
            v_next: vec![0.; cells],
            params,
            seed,
        }
    }
}

impl GridSimulation for FitzHughNagumo {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn reseed(&mut self, mask: &SeedMask, rng: &mut StdRng) {
        self.u.fill(1.);
        self.v.fill(0.);
        let (v, width) = (&mut self.v, self.width);
        seed_activated_cells(mask, &self.seed, rng, self.width, self.height, |x, y| {
            v[y * width + x] = 1.;
        });

        // A light sprinkle of half-excited cells keeps the medium from settling
        // into a single synchronized front
        let sprinkle = self.params.sprinkle_fraction.clamp(0., 1.);
        if sprinkle > 0. {
            for value in &mut self.v {
                if rng.gen::<f32>() < sprinkle {
                    *value = 0.5;
                }
            }
        }
    }

    fn step(&mut self) {
        let p = self.params;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                let u = self.u[i];
                let v = self.v[i];
                let lap_u = laplacian(&self.u, self.width, self.height, x, y);
                let lap_v = laplacian(&self.v, self.width, self.height, x, y);

                let du = p.diffusion_u * lap_u + u - u * u * u - v + p.drive;
                let dv = p.diffusion_v * lap_v + p.epsilon * (u - p.gamma * v);
                self.u_next[i] = (u + p.time_scale * du).clamp(0., 1.);
                self.v_next[i] = (v + p.time_scale * dv).clamp(0., 1.);
            }
        }
        std::mem::swap(&mut self.u, &mut self.u_next);
        std::mem::swap(&mut self.v, &mut self.v_next);
    }

    fn sample(&self, out: &mut ScalarField) {
        out.reshape(self.width, self.height);
        for (value, (u, v)) in out.values.iter_mut().zip(self.u.iter().zip(&self.v)) {
            *value = (u - v).clamp(0., 1.);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn no_blotches() -> SeedOptions {
        SeedOptions {
            min_blotches: 0,
            max_blotches: 0,
            ..SeedOptions::default()
        }
    }

    fn cross_mask(width: usize, height: usize) -> SeedMask {
        let mut values = vec![1.; width * height];
        for x in 0..width {
            values[(height / 2) * width + x] = 0.;
        }
        for y in 0..height {
            values[y * width + width / 2] = 0.;
        }
        SeedMask::from_values(width, height, values)
    }

    #[test]
    fn gray_scott_reseed_reproduces_mask_regions() {
        let mut sim = GrayScott::new(16, 12, GrayScottParams::default(), no_blotches());
        let mask = cross_mask(16, 12);
        let mut rng = StdRng::seed_from_u64(3);
        sim.reseed(&mask, &mut rng);

        let mut field = ScalarField::new(16, 12);
        sim.sample(&mut field);
        for y in 0..12 {
            for x in 0..16 {
                let activated = y == 6 || x == 8;
                let expected = if activated { 0. } else { 1. };
                assert_eq!(field.values[y * 16 + x], expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn gray_scott_values_stay_clamped() {
        let mut sim = GrayScott::new(24, 24, GrayScottParams::default(), SeedOptions::default());
        let mask = cross_mask(24, 24);
        let mut rng = StdRng::seed_from_u64(5);
        sim.reseed(&mask, &mut rng);

        for _ in 0..200 {
            sim.step();
        }
        assert!(sim.a.iter().chain(&sim.b).all(|&v| (0. ..=1.).contains(&v)));
    }

    #[test]
    fn gray_scott_uniform_resting_state_is_stable() {
        // A=1, B=0 everywhere: no reaction, no diffusion gradient, feed term zero
        let mut sim = GrayScott::new(8, 8, GrayScottParams::default(), no_blotches());
        sim.step();
        assert!(sim.a.iter().all(|&a| (a - 1.).abs() < 1e-6));
        assert!(sim.b.iter().all(|&b| b.abs() < 1e-6));
    }

    #[test]
    fn fitzhugh_nagumo_values_stay_clamped() {
        let mut sim = FitzHughNagumo::new(
            24,
            24,
            FitzHughNagumoParams::default(),
            SeedOptions::default(),
        );
        let mask = cross_mask(24, 24);
        let mut rng = StdRng::seed_from_u64(9);
        sim.reseed(&mask, &mut rng);

        for _ in 0..200 {
            sim.step();
        }
        assert!(sim.u.iter().chain(&sim.v).all(|&v| (0. ..=1.).contains(&v)));
    }

    #[test]
    fn fitzhugh_nagumo_sprinkle_marks_some_cells() {
        let params = FitzHughNagumoParams {
            sprinkle_fraction: 0.5,
            ..FitzHughNagumoParams::default()
        };
        let mut sim = FitzHughNagumo::new(32, 32, params, no_blotches());
        let mask = SeedMask::from_values(32, 32, vec![1.; 32 * 32]);
        let mut rng = StdRng::seed_from_u64(13);
        sim.reseed(&mask, &mut rng);
        let sprinkled = sim.v.iter().filter(|&&v| v == 0.5).count();
        assert!(sprinkled > 0, "expected some cells at the sprinkle value");
    }
}
