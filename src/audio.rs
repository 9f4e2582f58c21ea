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

use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SizedSample, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};

// Keep a few frames in flight; when the consumer stalls, frames are dropped in
// the capture callback rather than blocking the audio device
const FRAME_CHANNEL_CAPACITY: usize = 4;

// One mono frame of signed 16-bit samples, exactly `chunk` long
pub struct AudioFrame {
    pub samples: Vec<i16>,
}

impl AudioFrame {
    pub fn silence(chunk: usize) -> Self {
        Self {
            samples: vec![0; chunk],
        }
    }
}

// Pull interface over the default capture device. The cpal stream stays alive
// for as long as this struct does
pub struct AudioInput {
    rx: Receiver<AudioFrame>,
    chunk: usize,
    sample_rate: u32,
    read_timeout: Duration,
    _stream: cpal::Stream,
}

impl AudioInput {
    // Open the default input device at its native format. A missing device or
    // unsupported format is a construction-time failure; everything after that
    // degrades to silent frames instead of erroring
    pub fn open(chunk: usize) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no audio input device available"))?;
        println!(
            "Audio input: {:?}",
            device
                .name()
                .unwrap_or_else(|_| String::from("Unnamed device"))
        );

        let supported = device
            .default_input_config()
            .context("querying the default input format")?;
        let sample_rate = supported.sample_rate().0;
        let channels = usize::from(supported.channels());
        let config: StreamConfig = supported.config();

        let (tx, rx) = bounded(FRAME_CHANNEL_CAPACITY);
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                build_capture_stream::<f32>(&device, &config, channels, chunk, tx)
            }
            cpal::SampleFormat::I16 => {
                build_capture_stream::<i16>(&device, &config, channels, chunk, tx)
            }
            cpal::SampleFormat::U16 => {
                build_capture_stream::<u16>(&device, &config, channels, chunk, tx)
            }
            other => bail!("unsupported input sample format: {other:?}"),
        }
        .context("building the capture stream")?;
        stream.play().context("starting the capture stream")?;

        // Allow roughly two frame periods before treating a read as an underrun
        let read_timeout = Duration::from_secs_f64(2. * chunk as f64 / f64::from(sample_rate));

        Ok(Self {
            rx,
            chunk,
            sample_rate,
            read_timeout,
            _stream: stream,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    // Blocking read of the next frame. An underrun or a dead capture stream
    // substitutes silence so the detection path never sees a device error
    pub fn read_frame(&self) -> AudioFrame {
        match self.rx.recv_timeout(self.read_timeout) {
            Ok(frame) => frame,
            Err(_) => AudioFrame::silence(self.chunk),
        }
    }
}

// Mix interleaved device samples down to mono i16 and accumulate exact
// `chunk`-length frames for the consumer
fn build_capture_stream<T>(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    chunk: usize,
    tx: Sender<AudioFrame>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let mut pending: Vec<i16> = Vec::with_capacity(chunk);

    device.build_input_stream(
        config,
        move |data: &[T], _| {
            let frames = data.len() / channels;
            for i in 0..frames {
                let start = channels * i;
                let sum: f32 = data[start..start + channels]
                    .iter()
                    .map(|s| f32::from_sample(*s))
                    .sum();
                let avg = sum / channels as f32;
                pending.push((avg * f32::from(i16::MAX)).clamp(-32_768., 32_767.) as i16);

                if pending.len() == chunk {
                    let samples = std::mem::replace(&mut pending, Vec::with_capacity(chunk));
                    let _ = tx.try_send(AudioFrame { samples });
                }
            }
        },
        |e| eprintln!("Error on audio input stream: {e:?}"),
        None,
    )
}
