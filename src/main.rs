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

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use beat_bloom::analysis::{BeatDetector, SpectralEnergyAnalyzer};
use beat_bloom::app_config::{self, AppConfig};
use beat_bloom::audio::AudioInput;
use beat_bloom::palette::Palette;
use beat_bloom::scene::{build_simulation, default_palette, SceneController};
use beat_bloom::simulation::SeedMask;

const CONFIG_PATH: &str = "beat_bloom.toml";
const PRINT_METER: bool = true;
const METER_WIDTH: usize = 48;

fn main() -> anyhow::Result<()> {
    let config = match std::path::Path::new(CONFIG_PATH).exists() {
        true => app_config::parse_file(CONFIG_PATH)?,
        false => {
            println!("No {CONFIG_PATH} found, using default settings");
            AppConfig::default()
        }
    };

    // Asset and device failures here are fatal; the frame loop below never is
    let seed_mask = SeedMask::from_image(&config.seed_image, config.grid_width, config.grid_height)?;
    let palette = match &config.palette {
        Some(filepath) => Palette::from_file(filepath)?,
        None => default_palette(config.simulation, config.dying_levels),
    };
    let audio = AudioInput::open(config.chunk)?;
    println!("Capture rate: {}Hz, chunk: {} samples", audio.sample_rate(), config.chunk);

    let mut analyzer = SpectralEnergyAnalyzer::new(
        config.chunk,
        audio.sample_rate() as f32,
        config.low_freq,
        config.high_freq,
    );
    let mut detector = BeatDetector::new(config.rolling_window);
    let mut scene = SceneController::new(
        build_simulation(&config),
        seed_mask,
        palette,
        config.max_presim_steps,
        StdRng::from_entropy(),
    );

    // Frame loop: read audio, detect beat, step simulation, map palette.
    // Each frame is independent; a quiet or dropped frame simply yields
    // no beat and one more simulation step
    let start = Instant::now();
    let mut peak_energy = f32::MIN_POSITIVE;
    println!("Begin frame loop...");
    loop {
        let frame = audio.read_frame();
        let energy = analyzer.analyze(&frame);
        let now = start.elapsed().as_secs_f64();
        let beat = detector.detect(
            energy,
            config.threshold_multiplier,
            config.cooldown_seconds,
            now,
        );

        if beat {
            scene.on_beat();
        }
        let colors = scene.on_tick();
        // The color field is where a presentation layer would take over;
        // this binary only drives the console meter below
        let _ = colors.as_bytes();

        if PRINT_METER {
            peak_energy = peak_energy.max(energy);
            let filled = ((energy / peak_energy) * METER_WIDTH as f32) as usize;
            let meter: String = (0..METER_WIDTH)
                .map(|i| if i < filled { '#' } else { ' ' })
                .collect();
            println!(
                "{meter} energy:{energy:>12.0} {}",
                if beat { "BEAT" } else { "" }
            );
        }
    }
}
