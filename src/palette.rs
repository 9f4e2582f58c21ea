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

use anyhow::{anyhow, bail};
use bytemuck::{Pod, Zeroable};
use css_color_parser::Color as CssColor;
use serde::Deserialize;

use crate::simulation::ScalarField;

#[repr(C)]
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug, Zeroable, Pod)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// Render-ready RGB field for the presentation layer. Treated as immutable by
// the receiver once handed off for a frame
pub struct ColorField {
    width: usize,
    height: usize,
    pub pixels: Vec<Rgb>,
}

impl ColorField {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn reshape(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels.resize(width * height, Rgb::default());
        }
    }

    // Raw view for handing the frame to a renderer or encoder
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

// Palette asset entries may be CSS color strings or plain channel triples
#[derive(Deserialize)]
#[serde(untagged)]
enum PaletteColor {
    ColorString(String),
    Triple([u8; 3]),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PaletteFile {
    colors: Vec<PaletteColor>,
}

// An ordered color ramp; index 0 and the last index are the extremes of the
// mapped scalar range
#[derive(Clone)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> anyhow::Result<Self> {
        if colors.len() < 2 {
            bail!(
                "a palette needs at least two colors to form a ramp, got {}",
                colors.len()
            );
        }
        Ok(Self { colors })
    }

    pub fn from_file(filepath: &str) -> anyhow::Result<Self> {
        let file: PaletteFile = toml::from_str(&std::fs::read_to_string(filepath)?)?;

        let mut colors = Vec::with_capacity(file.colors.len());
        for entry in &file.colors {
            colors.push(match entry {
                PaletteColor::ColorString(css_color) => {
                    let c = css_color
                        .parse::<CssColor>()
                        .map_err(|e| anyhow!("invalid palette color {css_color:?}: {e:?}"))?;
                    Rgb::new(c.r, c.g, c.b)
                }
                PaletteColor::Triple([r, g, b]) => Rgb::new(*r, *g, *b),
            });
        }

        Self::new(colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    // Clamp into [0, 1], scale by len-1, truncate. The extra `min` keeps the
    // index inside the table even when rounding pushes the product past the end
    pub fn color_for(&self, value: f32) -> Rgb {
        let scaled = value.clamp(0., 1.) * (self.colors.len() - 1) as f32;
        let index = (scaled as usize).min(self.colors.len() - 1);
        self.colors[index]
    }

    pub fn map(&self, field: &ScalarField, out: &mut ColorField) {
        out.reshape(field.width(), field.height());
        for (pixel, value) in out.pixels.iter_mut().zip(&field.values) {
            *pixel = self.color_for(*value);
        }
    }
}

// Built-in ramp for the reaction-diffusion variants: white through ember reds
// and violets into deep blue and black
pub const BLOOM_RAMP: [Rgb; 97] = [
    Rgb::new(255, 255, 255), Rgb::new(252, 243, 244), Rgb::new(250, 231, 233), Rgb::new(247, 219, 222),
    Rgb::new(245, 208, 211), Rgb::new(243, 196, 200), Rgb::new(240, 184, 189), Rgb::new(238, 172, 178),
    Rgb::new(236, 161, 167), Rgb::new(233, 149, 156), Rgb::new(231, 137, 145), Rgb::new(228, 125, 134),
    Rgb::new(226, 114, 123), Rgb::new(224, 102, 112), Rgb::new(221, 90, 101), Rgb::new(219, 78, 90),
    Rgb::new(217, 67, 80), Rgb::new(218, 69, 86), Rgb::new(220, 72, 92), Rgb::new(221, 74, 99),
    Rgb::new(223, 77, 105), Rgb::new(224, 80, 111), Rgb::new(226, 82, 118), Rgb::new(227, 85, 124),
    Rgb::new(229, 88, 131), Rgb::new(231, 90, 137), Rgb::new(232, 93, 143), Rgb::new(234, 95, 150),
    Rgb::new(235, 98, 156), Rgb::new(237, 101, 162), Rgb::new(238, 103, 169), Rgb::new(240, 106, 175),
    Rgb::new(242, 109, 182), Rgb::new(235, 106, 182), Rgb::new(229, 103, 183), Rgb::new(223, 100, 183),
    Rgb::new(216, 98, 184), Rgb::new(210, 95, 184), Rgb::new(204, 92, 185), Rgb::new(197, 89, 185),
    Rgb::new(191, 87, 186), Rgb::new(185, 84, 187), Rgb::new(178, 81, 187), Rgb::new(172, 78, 188),
    Rgb::new(166, 76, 188), Rgb::new(159, 73, 189), Rgb::new(153, 70, 189), Rgb::new(147, 67, 190),
    Rgb::new(141, 65, 191), Rgb::new(133, 65, 186), Rgb::new(126, 65, 181), Rgb::new(118, 66, 176),
    Rgb::new(111, 66, 172), Rgb::new(103, 66, 167), Rgb::new(96, 67, 162), Rgb::new(88, 67, 157),
    Rgb::new(81, 68, 153), Rgb::new(74, 68, 148), Rgb::new(66, 68, 143), Rgb::new(59, 69, 138),
    Rgb::new(51, 69, 134), Rgb::new(44, 69, 129), Rgb::new(36, 70, 124), Rgb::new(29, 70, 119),
    Rgb::new(22, 71, 115), Rgb::new(25, 76, 119), Rgb::new(28, 81, 124), Rgb::new(31, 87, 129),
    Rgb::new(35, 92, 134), Rgb::new(38, 98, 138), Rgb::new(41, 103, 143), Rgb::new(45, 109, 148),
    Rgb::new(48, 114, 153), Rgb::new(51, 119, 157), Rgb::new(55, 125, 162), Rgb::new(58, 130, 167),
    Rgb::new(61, 136, 172), Rgb::new(65, 141, 176), Rgb::new(68, 147, 181), Rgb::new(71, 152, 186),
    Rgb::new(75, 158, 191), Rgb::new(70, 148, 179), Rgb::new(65, 138, 167), Rgb::new(60, 128, 155),
    Rgb::new(56, 118, 143), Rgb::new(51, 108, 131), Rgb::new(46, 98, 119), Rgb::new(42, 88, 107),
    Rgb::new(37, 79, 95), Rgb::new(32, 69, 83), Rgb::new(28, 59, 71), Rgb::new(23, 49, 59),
    Rgb::new(18, 39, 47), Rgb::new(14, 29, 35), Rgb::new(9, 19, 23), Rgb::new(4, 9, 11),
    Rgb::new(0, 0, 0),
];

// Dead/alive duotone for the Game of Life
pub const LIFE_DUOTONE: [Rgb; 2] = [Rgb::new(0, 0, 0), Rgb::new(217, 67, 80)];

// Off, on, and nine dying levels for Brian's Brain; the tail fades the trails
pub const BRAIN_TRAILS: [Rgb; 11] = [
    Rgb::new(13, 27, 36),
    Rgb::new(217, 67, 80),
    Rgb::new(229, 88, 131),
    Rgb::new(242, 109, 182),
    Rgb::new(191, 87, 186),
    Rgb::new(141, 65, 191),
    Rgb::new(81, 68, 153),
    Rgb::new(22, 71, 115),
    Rgb::new(48, 114, 153),
    Rgb::new(75, 158, 191),
    Rgb::new(37, 79, 95),
];
