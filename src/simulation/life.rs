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

const DEAD: u8 = 0;
const ALIVE: u8 = 1;

// Conway's Game of Life on a torus: birth on exactly 3 live Moore neighbors,
// survival on 2 or 3. The per-cell rule is embarrassingly parallel across
// rows, so the step runs through the row-band executor
pub struct GameOfLife {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    next: Vec<u8>,
    executor: ParallelStepExecutor,
    seed: SeedOptions,
}

impl GameOfLife {
    pub fn new(width: usize, height: usize, workers: usize, seed: SeedOptions) -> Self {
        let cells = width * height;
        Self {
            width,
            height,
            cells: vec![DEAD; cells],
            next: vec![DEAD; cells],
            executor: ParallelStepExecutor::new(workers),
            seed,
        }
    }
}

impl GridSimulation for GameOfLife {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn reseed(&mut self, mask: &SeedMask, rng: &mut StdRng) {
        self.cells.fill(DEAD);
        let (cells, width) = (&mut self.cells, self.width);
        seed_activated_cells(mask, &self.seed, rng, self.width, self.height, |x, y| {
            cells[y * width + x] = ALIVE;
        });
    }

    fn step(&mut self) {
        let (width, height) = (self.width, self.height);
        self.executor
            .run(width, &self.cells, &mut self.next, |first_row, previous, band| {
                for (r, row) in band.chunks_mut(width).enumerate() {
                    let y = first_row + r;
                    for (x, cell) in row.iter_mut().enumerate() {
                        let live = moore_neighbors(previous, width, height, x, y, ALIVE);
                        let alive = previous[y * width + x] == ALIVE;
                        *cell = u8::from(live == 3 || (alive && live == 2));
                    }
                }
            });
        std::mem::swap(&mut self.cells, &mut self.next);
    }

    fn sample(&self, out: &mut ScalarField) {
        out.reshape(self.width, self.height);
        for (value, cell) in out.values.iter_mut().zip(&self.cells) {
            *value = f32::from(*cell);
        }
    }
}
