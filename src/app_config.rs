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

use serde::Deserialize;

use crate::simulation::reaction_diffusion::{FitzHughNagumoParams, GrayScottParams};
use crate::simulation::SeedOptions;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationKind {
    GrayScott,
    FitzhughNagumo,
    Life,
    BriansBrain,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlData {
    pub chunk: Option<usize>,
    pub low_freq: Option<f32>,
    pub high_freq: Option<f32>,
    pub rolling_window: Option<usize>,
    pub threshold_multiplier: Option<f32>,
    pub cooldown_seconds: Option<f32>,

    pub grid_width: Option<usize>,
    pub grid_height: Option<usize>,
    pub workers: Option<usize>,
    pub max_presim_steps: Option<u32>,
    pub dying_levels: Option<u8>,

    pub seed_image: Option<String>,
    pub palette: Option<String>,
    pub simulation: Option<SimulationKind>,

    #[serde(default)]
    pub seeding: SeedOptions,
    #[serde(default)]
    pub gray_scott: GrayScottParams,
    #[serde(default)]
    pub fitzhugh_nagumo: FitzHughNagumoParams,
}

// Hardcoded default values
const DEFAULT_CHUNK: usize = 1024;
const DEFAULT_LOW_FREQ: f32 = 20.;
const DEFAULT_HIGH_FREQ: f32 = 150.;
const DEFAULT_ROLLING_WINDOW: usize = 50;
const DEFAULT_THRESHOLD_MULTIPLIER: f32 = 2.;
const DEFAULT_COOLDOWN_SECONDS: f32 = 0.3;
const DEFAULT_GRID_WIDTH: usize = 240;
const DEFAULT_GRID_HEIGHT: usize = 180;
const DEFAULT_WORKERS: usize = 4;
const DEFAULT_MAX_PRESIM_STEPS: u32 = 100;
const DEFAULT_DYING_LEVELS: u8 = 9;
const DEFAULT_SEED_IMAGE: &str = "resources/seed.png";

#[derive(Clone)]
pub struct AppConfig {
    pub chunk: usize,
    pub low_freq: f32,
    pub high_freq: f32,
    pub rolling_window: usize,
    pub threshold_multiplier: f32,
    pub cooldown_seconds: f32,

    pub grid_width: usize,
    pub grid_height: usize,
    pub workers: usize,
    pub max_presim_steps: u32,
    pub dying_levels: u8,

    pub seed_image: String,
    pub palette: Option<String>,
    pub simulation: SimulationKind,

    pub seeding: SeedOptions,
    pub gray_scott: GrayScottParams,
    pub fitzhugh_nagumo: FitzHughNagumoParams,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chunk: DEFAULT_CHUNK,
            low_freq: DEFAULT_LOW_FREQ,
            high_freq: DEFAULT_HIGH_FREQ,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            threshold_multiplier: DEFAULT_THRESHOLD_MULTIPLIER,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,

            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            workers: DEFAULT_WORKERS,
            max_presim_steps: DEFAULT_MAX_PRESIM_STEPS,
            dying_levels: DEFAULT_DYING_LEVELS,

            seed_image: String::from(DEFAULT_SEED_IMAGE),
            palette: None,
            simulation: SimulationKind::GrayScott,

            seeding: SeedOptions::default(),
            gray_scott: GrayScottParams::default(),
            fitzhugh_nagumo: FitzHughNagumoParams::default(),
        }
    }
}

pub fn parse_file(filepath: &str) -> anyhow::Result<AppConfig> {
    parse_str(&std::fs::read_to_string(filepath)?)
}

pub fn parse_str(contents: &str) -> anyhow::Result<AppConfig> {
    let config: TomlData = toml::from_str(contents)?;

    let chunk = config.chunk.unwrap_or(DEFAULT_CHUNK);
    if chunk < 2 {
        anyhow::bail!("`chunk` must be at least 2 samples, was given: {chunk}");
    }

    let rolling_window = config.rolling_window.unwrap_or(DEFAULT_ROLLING_WINDOW);
    if rolling_window == 0 {
        anyhow::bail!("`rolling_window` must be a positive number of frames");
    }

    let threshold_multiplier = config
        .threshold_multiplier
        .unwrap_or(DEFAULT_THRESHOLD_MULTIPLIER);
    if threshold_multiplier <= 0. {
        anyhow::bail!(
            "`threshold_multiplier` must be a positive number, was given: {threshold_multiplier}"
        );
    }

    let cooldown_seconds = config.cooldown_seconds.unwrap_or(DEFAULT_COOLDOWN_SECONDS);
    if cooldown_seconds < 0. {
        anyhow::bail!("`cooldown_seconds` cannot be negative, was given: {cooldown_seconds}");
    }

    let grid_width = config.grid_width.unwrap_or(DEFAULT_GRID_WIDTH);
    let grid_height = config.grid_height.unwrap_or(DEFAULT_GRID_HEIGHT);
    if grid_width < 3 || grid_height < 3 {
        anyhow::bail!("grid dimensions must be at least 3x3, was given: {grid_width}x{grid_height}");
    }

    let dying_levels = config.dying_levels.unwrap_or(DEFAULT_DYING_LEVELS);
    if dying_levels == 0 {
        anyhow::bail!("`dying_levels` must be at least 1");
    }

    // The frequency band is allowed to be empty (it only under-detects), and
    // worker counts are clamped rather than rejected
    Ok(AppConfig {
        chunk,
        low_freq: config.low_freq.unwrap_or(DEFAULT_LOW_FREQ),
        high_freq: config.high_freq.unwrap_or(DEFAULT_HIGH_FREQ),
        rolling_window,
        threshold_multiplier,
        cooldown_seconds,

        grid_width,
        grid_height,
        workers: config.workers.unwrap_or(DEFAULT_WORKERS).max(1),
        max_presim_steps: config.max_presim_steps.unwrap_or(DEFAULT_MAX_PRESIM_STEPS),
        dying_levels,

        seed_image: config
            .seed_image
            .unwrap_or_else(|| String::from(DEFAULT_SEED_IMAGE)),
        palette: config.palette,
        simulation: config.simulation.unwrap_or(SimulationKind::GrayScott),

        seeding: config.seeding,
        gray_scott: config.gray_scott,
        fitzhugh_nagumo: config.fitzhugh_nagumo,
    })
}
