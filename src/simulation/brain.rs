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

use rand::rngs::StdRng;

use super::executor::ParallelStepExecutor;
use super::{moore_neighbors, seed_activated_cells, GridSimulation, ScalarField, SeedMask, SeedOptions};

const OFF: u8 = 0;
const ON: u8 = 1;

// Brian's Brain with graded decay: off cells with exactly two firing Moore
// neighbors fire, firing cells always start dying, and dying cells walk
// through `dying_levels` states back to off regardless of their neighbors.
// The graded walk exists to drive a fading-trail palette
pub struct BriansBrain {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    next: Vec<u8>,
    dying_levels: u8,
    executor: ParallelStepExecutor,
    seed: SeedOptions,
}

impl BriansBrain {
    pub fn new(
        width: usize,
        height: usize,
        dying_levels: u8,
        workers: usize,
        seed: SeedOptions,
    ) -> Self {
        let cells = width * height;
        Self {
            width,
            height,
            cells: vec![OFF; cells],
            next: vec![OFF; cells],
            dying_levels: dying_levels.max(1),
            executor: ParallelStepExecutor::new(workers),
            seed,
        }
    }

    // Total number of distinct cell states: off, on, and the dying walk
    fn states(&self) -> u8 {
        self.dying_levels + 2
    }
}

impl GridSimulation for BriansBrain {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn reseed(&mut self, mask: &SeedMask, rng: &mut StdRng) {
        self.cells.fill(OFF);
        let (cells, width) = (&mut self.cells, self.width);
        seed_activated_cells(mask, &self.seed, rng, self.width, self.height, |x, y| {
            cells[y * width + x] = ON;
        });
    }

    fn step(&mut self) {
        let (width, height) = (self.width, self.height);
        let states = self.states();
        self.executor
            .run(width, &self.cells, &mut self.next, |first_row, previous, band| {
                for (r, row) in band.chunks_mut(width).enumerate() {
                    let y = first_row + r;
                    for (x, cell) in row.iter_mut().enumerate() {
                        let state = previous[y * width + x];
                        *cell = if state == OFF {
                            let firing = moore_neighbors(previous, width, height, x, y, ON);
                            if firing == 2 {
                                ON
                            } else {
                                OFF
                            }
                        } else {
                            // ON enters the dying walk; the terminal level wraps to OFF
                            (state + 1) % states
                        };
                    }
                }
            });
        std::mem::swap(&mut self.cells, &mut self.next);
    }

    // Normalized so each state maps to a distinct palette entry when the
    // palette holds exactly `states()` colors
    fn sample(&self, out: &mut ScalarField) {
        out.reshape(self.width, self.height);
        let top = f32::from(self.dying_levels + 1);
        for (value, cell) in out.values.iter_mut().zip(&self.cells) {
            *value = f32::from(*cell) / top;
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

    fn mask_with_on_cells(width: usize, height: usize, on: &[(usize, usize)]) -> SeedMask {
        let mut values = vec![1.; width * height];
        for &(x, y) in on {
            values[y * width + x] = 0.;
        }
        SeedMask::from_values(width, height, values)
    }

    #[test]
    fn lone_firing_cell_walks_through_decay_to_off() {
        let mut sim = BriansBrain::new(8, 8, 3, 2, no_blotches());
        let mask = mask_with_on_cells(8, 8, &[(4, 4)]);
        let mut rng = StdRng::seed_from_u64(1);
        sim.reseed(&mask, &mut rng);

        let center = 4 * 8 + 4;
        assert_eq!(sim.cells[center], ON);
        for expected in [2, 3, 4] {
            sim.step();
            assert_eq!(sim.cells[center], expected);
        }
        sim.step();
        assert_eq!(sim.cells[center], OFF);
    }

    #[test]
    fn off_cell_with_two_firing_neighbors_fires() {
        let mut sim = BriansBrain::new(8, 8, 9, 2, no_blotches());
        let mask = mask_with_on_cells(8, 8, &[(3, 3), (5, 3)]);
        let mut rng = StdRng::seed_from_u64(1);
        sim.reseed(&mask, &mut rng);

        sim.step();
        // The cell between the two firing cells sees exactly two ON neighbors
        assert_eq!(sim.cells[3 * 8 + 4], ON);
        // The originals have moved on to the first dying level
        assert_eq!(sim.cells[3 * 8 + 3], 2);
        assert_eq!(sim.cells[3 * 8 + 5], 2);
    }

    #[test]
    fn dying_cells_ignore_their_neighbors() {
        // Surround a dying cell with firing cells; it still advances its walk
        let mut sim = BriansBrain::new(8, 8, 9, 2, no_blotches());
        let mask = mask_with_on_cells(8, 8, &[(2, 2), (3, 2), (4, 2), (2, 3), (4, 3)]);
        let mut rng = StdRng::seed_from_u64(1);
        sim.reseed(&mask, &mut rng);
        sim.cells[3 * 8 + 3] = 2;

        sim.step();
        assert_eq!(sim.cells[3 * 8 + 3], 3);
    }

    #[test]
    fn sample_gives_each_state_a_distinct_level() {
        let mut sim = BriansBrain::new(4, 4, 9, 1, no_blotches());
        for (i, cell) in sim.cells.iter_mut().enumerate().take(11) {
            *cell = i as u8;
        }
        let mut field = ScalarField::new(4, 4);
        sim.sample(&mut field);

        // With an 11-color palette the scaled index recovers the state exactly
        for state in 0..11 {
            let index = (field.values[state] * 10.).round() as usize;
            assert_eq!(index, state);
        }
    }
}
