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

//! Samples a live audio input, detects beats from band-limited spectral
//! energy, and lets those beats reseed grid simulations (reaction-diffusion
//! and cellular automata) whose state is mapped to render-ready color fields.

pub mod analysis;
pub mod app_config;
pub mod audio;
pub mod palette;
pub mod scene;
pub mod simulation;
