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

// End-to-end scenarios across the analysis and simulation halves, using
// synthesized audio frames and generated asset files in place of a live
// device and real artwork.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use beat_bloom::analysis::{BeatDetector, SpectralEnergyAnalyzer};
use beat_bloom::app_config::SimulationKind;
use beat_bloom::audio::AudioFrame;
use beat_bloom::palette::Palette;
use beat_bloom::scene::{default_palette, SceneController};
use beat_bloom::simulation::life::GameOfLife;
use beat_bloom::simulation::reaction_diffusion::{GrayScott, GrayScottParams};
use beat_bloom::simulation::{GridSimulation, ScalarField, SeedMask, SeedOptions};

const CHUNK: usize = 1024;
const SAMPLE_RATE: f32 = 44_100.;
const FRAME_SECONDS: f64 = CHUNK as f64 / SAMPLE_RATE as f64;

fn noise_frame(rng: &mut StdRng, amplitude: i16) -> AudioFrame {
    let samples = (0..CHUNK)
        .map(|_| rng.gen_range(-amplitude..=amplitude))
        .collect();
    AudioFrame { samples }
}

// A noise frame with a strong low-frequency tone mixed in, emulating a kick
fn spike_frame(rng: &mut StdRng, noise_amplitude: i16, tone_amplitude: f32) -> AudioFrame {
    let mut frame = noise_frame(rng, noise_amplitude);
    for (i, sample) in frame.samples.iter_mut().enumerate() {
        let t = i as f32 / SAMPLE_RATE;
        let tone = tone_amplitude * (2. * std::f32::consts::PI * 90. * t).sin();
        *sample = sample.saturating_add(tone as i16);
    }
    frame
}

#[test]
fn noise_floor_then_spike_fires_exactly_once_per_cooldown() {
    let mut analyzer = SpectralEnergyAnalyzer::new(CHUNK, SAMPLE_RATE, 20., 150.);
    let mut detector = BeatDetector::new(50);
    let mut rng = StdRng::seed_from_u64(99);

    // Fifty frames of low-amplitude white noise to fill the rolling window
    let mut frame_index = 0;
    for _ in 0..50 {
        let energy = analyzer.analyze(&noise_frame(&mut rng, 400));
        let now = frame_index as f64 * FRAME_SECONDS;
        assert!(!detector.detect(energy, 2., 0.3, now));
        frame_index += 1;
    }

    // The spike frame carries ten times the low-band amplitude and must fire
    let energy = analyzer.analyze(&spike_frame(&mut rng, 400, 4_000.));
    let now = frame_index as f64 * FRAME_SECONDS;
    assert!(detector.detect(energy, 2., 0.3, now));
    frame_index += 1;

    // An equally loud frame ~23ms later sits inside the 0.3s cooldown
    let energy = analyzer.analyze(&spike_frame(&mut rng, 400, 4_000.));
    let now = frame_index as f64 * FRAME_SECONDS;
    assert!(!detector.detect(energy, 2., 0.3, now));
}

#[test]
fn seed_image_round_trips_through_mask_and_sample() {
    // Draw a tiny image: white background, one black row
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.png");
    let mut img = image::GrayImage::from_pixel(16, 12, image::Luma([255]));
    for x in 0..16 {
        img.put_pixel(x, 6, image::Luma([0]));
    }
    img.save(&path).unwrap();

    let mask = SeedMask::from_image(path.to_str().unwrap(), 16, 12).unwrap();
    let mut sim = GameOfLife::new(
        16,
        12,
        2,
        SeedOptions {
            min_blotches: 0,
            max_blotches: 0,
            ..SeedOptions::default()
        },
    );
    let mut rng = StdRng::seed_from_u64(4);
    sim.reseed(&mask, &mut rng);

    let mut field = ScalarField::new(16, 12);
    sim.sample(&mut field);
    for y in 0..12 {
        for x in 0..16 {
            let expected = if y == 6 { 1. } else { 0. };
            assert_eq!(field.values[y * 16 + x], expected, "cell ({x}, {y})");
        }
    }
}

#[test]
fn missing_seed_image_fails_at_construction() {
    assert!(SeedMask::from_image("/no/such/image.png", 8, 8).is_err());
}

#[test]
fn beats_drive_reseeds_through_the_controller() {
    let width = 32;
    let height = 24;
    let mut values = vec![1.; width * height];
    // An isolated live cell dies on the first tick, making reseeds observable
    values[12 * width + 7] = 0.;
    let mask = SeedMask::from_values(width, height, values);

    let sim = GameOfLife::new(
        width,
        height,
        4,
        SeedOptions {
            min_blotches: 0,
            max_blotches: 0,
            ..SeedOptions::default()
        },
    );
    let palette = default_palette(SimulationKind::Life, 9);
    let alive = palette.color_for(1.);
    let mut scene = SceneController::new(
        Box::new(sim),
        mask,
        palette,
        0,
        StdRng::seed_from_u64(21),
    );

    // Ticks without beats: the pattern decays and stays dead
    for _ in 0..3 {
        scene.on_tick();
    }
    let quiet = scene.on_tick();
    assert!(quiet.pixels.iter().all(|&p| p != alive));

    // A beat restores the mask; the lone cell then dies again on the next tick
    scene.on_beat();
    let after_beat = scene.on_tick();
    assert!(after_beat.pixels.iter().all(|&p| p != alive));
}

#[test]
fn gray_scott_session_stays_in_range_through_beats() {
    let width = 48;
    let height = 36;
    let mut values = vec![1.; width * height];
    for x in 10..30 {
        values[18 * width + x] = 0.;
    }
    let mask = SeedMask::from_values(width, height, values);

    let sim = GrayScott::new(width, height, GrayScottParams::default(), SeedOptions::default());
    let mut scene = SceneController::new(
        Box::new(sim),
        mask,
        Palette::new(beat_bloom::palette::BLOOM_RAMP.to_vec()).unwrap(),
        25,
        StdRng::seed_from_u64(8),
    );

    // Alternate quiet stretches and beats; every frame must stay mappable
    for round in 0..4 {
        if round % 2 == 1 {
            scene.on_beat();
        }
        for _ in 0..30 {
            let colors = scene.on_tick();
            assert_eq!(colors.pixels.len(), width * height);
        }
    }
}

#[test]
fn reseeding_is_deterministic_per_rng_seed() {
    let width = 20;
    let height = 20;
    let mask = SeedMask::from_values(width, height, vec![1.; width * height]);

    // Sparse blotches so distinct seeds cannot both happen to flood the grid
    let options = SeedOptions {
        min_blotches: 2,
        max_blotches: 6,
        min_blotch_half_width: 1,
        max_blotch_half_width: 2,
    };
    let run = |seed: u64| {
        let mut sim = GameOfLife::new(width, height, 3, options.clone());
        let mut rng = StdRng::seed_from_u64(seed);
        sim.reseed(&mask, &mut rng);
        let mut field = ScalarField::new(width, height);
        sim.sample(&mut field);
        field.values
    };

    assert_eq!(run(17), run(17));
    assert_ne!(run(17), run(18));
}
