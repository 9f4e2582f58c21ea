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

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::audio::AudioFrame;

// Reduces one audio frame to the summed spectrum magnitude of a frequency band.
// The FFT plan and its scratch space are created once and reused every frame
pub struct SpectralEnergyAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    band_bins: Range<usize>,
}

impl SpectralEnergyAnalyzer {
    // Frequency bin `k` of a `chunk`-point transform covers `k * sample_rate / chunk` Hertz.
    // Only bins up to the Nyquist frequency (the first half of the spectrum) are considered
    pub fn new(chunk: usize, sample_rate: f32, low_freq: f32, high_freq: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(chunk);
        let scratch = vec![Complex::default(); fft.get_inplace_scratch_len()];

        let frequency_resolution = sample_rate / chunk as f32;
        let half = chunk / 2;
        let start = ((low_freq / frequency_resolution).ceil().max(0.) as usize).min(half);
        let end = (((high_freq / frequency_resolution).floor().max(-1.) + 1.) as usize).min(half);

        Self {
            fft,
            buffer: vec![Complex::default(); chunk],
            scratch,
            // A band that selects no bins stays empty and simply sums to zero
            band_bins: start.min(end)..end,
        }
    }

    pub fn analyze(&mut self, frame: &AudioFrame) -> f32 {
        // Tolerate short frames by zero-padding instead of failing
        for (i, value) in self.buffer.iter_mut().enumerate() {
            let sample = frame.samples.get(i).copied().unwrap_or(0);
            *value = Complex::new(f32::from(sample), 0.);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        self.buffer[self.band_bins.clone()]
            .iter()
            .map(|bin| bin.norm())
            .sum()
    }
}

// Declares a beat when the band energy spikes above a multiple of its own
// recent average. The rolling window tracks ambient loudness without a
// calibration phase; the cooldown keeps one sustained onset from firing
// repeatedly as energy oscillates near the threshold
pub struct BeatDetector {
    window: VecDeque<f32>,
    capacity: usize,
    last_beat: Option<f64>,
}

impl BeatDetector {
    pub fn new(rolling_window: usize) -> Self {
        let capacity = rolling_window.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            last_beat: None,
        }
    }

    // `now` is in seconds from any fixed origin. Threshold and cooldown are read
    // on every call so external controls can change them at any time
    pub fn detect(
        &mut self,
        energy: f32,
        threshold_multiplier: f32,
        cooldown_seconds: f32,
        now: f64,
    ) -> bool {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(energy);

        // No detection before the window fills; a partial average invites false positives
        if self.window.len() < self.capacity {
            return false;
        }

        let mean = self.window.iter().sum::<f32>() / self.window.len() as f32;
        let cooled_down = self
            .last_beat
            .map_or(true, |t| now - t > f64::from(cooldown_seconds));

        if energy > threshold_multiplier * mean && cooled_down {
            self.last_beat = Some(now);
            true
        } else {
            false
        }
    }
}
