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

use crate::app_config::{AppConfig, SimulationKind};
use crate::palette::{ColorField, Palette, BLOOM_RAMP, BRAIN_TRAILS, LIFE_DUOTONE};
use crate::simulation::brain::BriansBrain;
use crate::simulation::life::GameOfLife;
use crate::simulation::reaction_diffusion::{FitzHughNagumo, GrayScott};
use crate::simulation::{GridSimulation, ScalarField, SeedMask};

// Dispatches beat events and frame ticks to whichever simulation is active.
// Owns the session state the frame loop needs: the simulation and its grids,
// the seed mask and palette assets, the random stream driving reseeds, and
// the scratch fields reused every frame
pub struct SceneController {
    simulation: Box<dyn GridSimulation>,
    seed_mask: SeedMask,
    palette: Palette,
    rng: StdRng,
    max_presim_steps: u32,
    scalar: ScalarField,
    colors: ColorField,
}

impl SceneController {
    // The controller reseeds immediately so the first rendered frame already
    // carries the mask
    pub fn new(
        mut simulation: Box<dyn GridSimulation>,
        seed_mask: SeedMask,
        palette: Palette,
        max_presim_steps: u32,
        mut rng: StdRng,
    ) -> Self {
        simulation.reseed(&seed_mask, &mut rng);
        let (width, height) = (simulation.width(), simulation.height());
        Self {
            simulation,
            seed_mask,
            palette,
            rng,
            max_presim_steps,
            scalar: ScalarField::new(width, height),
            colors: ColorField::new(width, height),
        }
    }

    // Beat contract: reseed from the mask, then burn a random number of steps
    // to skip past the unstable transient before the next render
    pub fn on_beat(&mut self) {
        self.simulation.reseed(&self.seed_mask, &mut self.rng);
        let presim_steps = self.rng.gen_range(0..=self.max_presim_steps);
        for _ in 0..presim_steps {
            self.simulation.step();
        }
    }

    // Tick contract: advance one step and hand back the mapped color field.
    // The returned reference is valid until the next call mutates the scratch
    pub fn on_tick(&mut self) -> &ColorField {
        self.simulation.step();
        self.simulation.sample(&mut self.scalar);
        self.palette.map(&self.scalar, &mut self.colors);
        &self.colors
    }

    // Scene switching replaces the simulation reference and its palette; the
    // new scene starts from a fresh reseed like any other
    pub fn set_simulation(&mut self, simulation: Box<dyn GridSimulation>, palette: Palette) {
        self.simulation = simulation;
        self.palette = palette;
        self.simulation.reseed(&self.seed_mask, &mut self.rng);
    }
}

// Map the configured variant to a boxed simulation
pub fn build_simulation(config: &AppConfig) -> Box<dyn GridSimulation> {
    let (width, height) = (config.grid_width, config.grid_height);
    let seed = config.seeding.clone();
    match config.simulation {
        SimulationKind::GrayScott => Box::new(GrayScott::new(width, height, config.gray_scott, seed)),
        SimulationKind::FitzhughNagumo => Box::new(FitzHughNagumo::new(
            width,
            height,
            config.fitzhugh_nagumo,
            seed,
        )),
        SimulationKind::Life => Box::new(GameOfLife::new(width, height, config.workers, seed)),
        SimulationKind::BriansBrain => Box::new(BriansBrain::new(
            width,
            height,
            config.dying_levels,
            config.workers,
            seed,
        )),
    }
}

// The built-in palette matching a variant's sample range
pub fn default_palette(kind: SimulationKind, dying_levels: u8) -> Palette {
    let colors = match kind {
        SimulationKind::GrayScott | SimulationKind::FitzhughNagumo => BLOOM_RAMP.to_vec(),
        SimulationKind::Life => LIFE_DUOTONE.to_vec(),
        // One entry per automaton state keeps the trail fade aligned
        SimulationKind::BriansBrain => {
            let states = usize::from(dying_levels) + 2;
            BRAIN_TRAILS.iter().copied().cycle().take(states.max(2)).collect()
        }
    };
    Palette::new(colors).expect("built-in palettes always hold at least two colors")
}
