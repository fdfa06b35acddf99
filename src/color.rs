// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colormaps for escape-time panels.

use image::Rgb;
use std::fmt;
use std::str::FromStr;

use crate::error::{invalid, Error};
use crate::escape::IterationResult;

/// The color of every point that never escaped.
pub const IN_SET: Rgb<u8> = Rgb([0, 0, 0]);

/// Blue through cream to a dark red.  The ramp stops short of black so
/// that slow escapes stay distinguishable from the set itself.
const GRADIENT: [(f64, f64, f64); 9] = [
    (0.0, 0.0, 0.2),
    (0.1, 0.2, 0.5),
    (0.2, 0.5, 0.8),
    (0.5, 0.8, 0.9),
    (1.0, 1.0, 0.8),
    (1.0, 0.8, 0.3),
    (1.0, 0.5, 0.1),
    (0.8, 0.2, 0.1),
    (0.5, 0.0, 0.2),
];

// Polynomial fit of the Turbo colormap, lowest order first.
const TURBO_RED: [f64; 6] = [
    0.13572138,
    4.61539260,
    -42.66032258,
    132.13108234,
    -152.94239396,
    59.28637943,
];
const TURBO_GREEN: [f64; 6] = [
    0.09140261,
    2.19418839,
    4.84296658,
    -14.18503333,
    4.27729857,
    2.82956604,
];
const TURBO_BLUE: [f64; 6] = [
    0.10667330,
    12.64194608,
    -60.58204836,
    110.36276771,
    -89.90310912,
    27.34824973,
];

/// How escape times become colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Palette {
    /// White for points that leave at once, darkening towards the set.
    Grayscale,
    /// The Turbo rainbow: dark blue through green to dark red.
    Turbo,
    /// A nine-stop blue, cream and red ramp.
    Gradient,
}

impl Palette {
    /// Every palette name `FromStr` accepts.
    pub const NAMES: [&'static str; 3] = ["grayscale", "turbo", "gradient"];

    /// Color for one pixel.  Escaped points are colored by how far
    /// through the iteration budget they got; bounded points are
    /// always `IN_SET`.
    pub fn color(self, result: IterationResult, max_iterations: u32) -> Rgb<u8> {
        if !result.escaped {
            return IN_SET;
        }
        let t = f64::from(result.iterations) / f64::from(max_iterations.max(1));
        match self {
            Palette::Grayscale => {
                // 1 to 255; 0 is left to the set.
                let v = 1 + (254.0 * (1.0 - t.max(0.0).min(1.0))).round() as u8;
                Rgb([v, v, v])
            }
            Palette::Turbo => turbo(t),
            Palette::Gradient => gradient(t),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Turbo
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Palette::Grayscale => "grayscale",
            Palette::Turbo => "turbo",
            Palette::Gradient => "gradient",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Palette {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(Palette::Grayscale),
            "turbo" => Ok(Palette::Turbo),
            "gradient" => Ok(Palette::Gradient),
            other => Err(invalid(format!(
                "Unknown palette '{}', expected one of {}",
                other,
                Palette::NAMES.join(", ")
            ))),
        }
    }
}

#[inline]
fn channel(v: f64) -> u8 {
    (v.max(0.0).min(1.0) * 255.0).round() as u8
}

fn polynomial(coefficients: &[f64; 6], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, k| acc * x + k)
}

fn turbo(t: f64) -> Rgb<u8> {
    let x = t.max(0.0).min(1.0);
    Rgb([
        channel(polynomial(&TURBO_RED, x)),
        channel(polynomial(&TURBO_GREEN, x)),
        channel(polynomial(&TURBO_BLUE, x)),
    ])
}

fn gradient(t: f64) -> Rgb<u8> {
    let scaled = t.max(0.0).min(1.0) * (GRADIENT.len() - 1) as f64;
    let idx = (scaled as usize).min(GRADIENT.len() - 2);
    let frac = scaled - idx as f64;

    let (r1, g1, b1) = GRADIENT[idx];
    let (r2, g2, b2) = GRADIENT[idx + 1];
    Rgb([
        channel(r1 + (r2 - r1) * frac),
        channel(g1 + (g2 - g1) * frac),
        channel(b1 + (b2 - b1) * frac),
    ])
}
