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

// Synchronous row-band fan-out for per-cell neighborhood updates.
//
// Every band reads the full previous grid and writes only its own rows of the
// new grid, so the join at the end of the scope is the only synchronization
// needed; no band ever observes a partially-updated cell
pub struct ParallelStepExecutor {
    workers: usize,
}

impl ParallelStepExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    // Run `update(first_row, previous, band)` for each contiguous band of rows
    // of `next`, blocking until every band has completed. The final band
    // absorbs the rows the division leaves over
    pub fn run<T, F>(&self, width: usize, previous: &[T], next: &mut [T], update: F)
    where
        T: Send + Sync,
        F: Fn(usize, &[T], &mut [T]) + Send + Sync,
    {
        let height = next.len() / width;
        let bands = self.workers.min(height).max(1);
        let rows_per_band = height / bands;

        rayon::scope(|scope| {
            let update = &update;
            let mut rest = next;
            for band in 0..bands {
                let first_row = band * rows_per_band;
                let band_rows = if band + 1 == bands {
                    height - first_row
                } else {
                    rows_per_band
                };
                let (chunk, tail) = rest.split_at_mut(band_rows * width);
                rest = tail;
                scope.spawn(move |_| update(first_row, previous, chunk));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Doubles each cell and stamps in the absolute row index, exercising the
    // band offset bookkeeping
    fn stamp(width: usize) -> impl Fn(usize, &[u32], &mut [u32]) + Send + Sync {
        move |first_row, previous, band| {
            for (r, row) in band.chunks_mut(width).enumerate() {
                let y = first_row + r;
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = 2 * previous[y * width + x] + y as u32;
                }
            }
        }
    }

    #[test]
    fn banded_update_matches_sequential() {
        let width = 4;
        let height = 10;
        let previous: Vec<u32> = (0..(width * height) as u32).collect();

        let mut sequential = vec![0; previous.len()];
        ParallelStepExecutor::new(1).run(width, &previous, &mut sequential, stamp(width));

        for workers in [2, 3, 4, 16] {
            let mut banded = vec![0; previous.len()];
            ParallelStepExecutor::new(workers).run(width, &previous, &mut banded, stamp(width));
            assert_eq!(banded, sequential, "mismatch with {workers} workers");
        }
    }

    #[test]
    fn more_workers_than_rows_still_covers_every_row() {
        let width = 3;
        let previous = vec![1u32; width * 2];
        let mut next = vec![0; previous.len()];
        ParallelStepExecutor::new(8).run(width, &previous, &mut next, stamp(width));
        assert_eq!(next, vec![2, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn zero_worker_request_degrades_to_one() {
        assert_eq!(ParallelStepExecutor::new(0).workers(), 1);
    }
}
