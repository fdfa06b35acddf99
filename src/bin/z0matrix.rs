// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate num_cpus;
extern crate z0mandel;

use clap::{App, Arg, ArgMatches};
use std::path::Path;
use z0mandel::cli::{
    require, require_complex, require_size, validate_pair, validate_positive, validate_range,
};
use z0mandel::limits::Limits;
use z0mandel::output::save_rgb;
use z0mandel::{EscapeParams, Orientation, Palette, VariantRenderer, Viewport, Z0Matrix};

const OUTPUT: &str = "output";
const PANEL: &str = "panel";
const GRID: &str = "grid";
const Z0RADIUS: &str = "z0-radius";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const ITERATIONS: &str = "iterations";
const ESCAPE: &str = "escape-radius";
const PALETTE: &str = "palette";
const THREADS: &str = "threads";
const MAXPIXELS: &str = "max-pixels";
const SOUTHUP: &str = "south-up";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("z0matrix")
        .version("0.1.0")
        .about("Renders a matrix of Mandelbrot variants, one panel per starting value z0")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the extension picks the format (png, pnm, bmp, ...)"),
        )
        .arg(
            Arg::with_name(PANEL)
                .long(PANEL)
                .short("p")
                .takes_value(true)
                .default_value("64x64")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse panel size"))
                .help("Size of each panel, in pixels"),
        )
        .arg(
            Arg::with_name(GRID)
                .long(GRID)
                .short("g")
                .takes_value(true)
                .default_value("9")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse grid size",
                        "Grid size must be between 1 and 4096",
                    )
                })
                .help("Number of panels along each axis"),
        )
        .arg(
            Arg::with_name(Z0RADIUS)
                .long(Z0RADIUS)
                .short("z")
                .takes_value(true)
                .default_value("3")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1.0e6,
                        "Could not parse z0 radius",
                        "The z0 radius must be between 0 and 1000000",
                    )
                })
                .help("z0 ranges over [-radius, radius] on both axes"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the c plane shown in every panel"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the c plane shown in every panel"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("50")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(ESCAPE)
                .long(ESCAPE)
                .short("e")
                .takes_value(true)
                .default_value("2.0")
                .validator(|s| validate_positive(&s, "The escape radius must be a positive number"))
                .help("Orbits farther than this from the origin have escaped"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .short("c")
                .takes_value(true)
                .default_value("turbo")
                .possible_values(&Palette::NAMES)
                .help("Colormap for escape times"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in the renderer [default: all cores]"),
        )
        .arg(
            Arg::with_name(MAXPIXELS)
                .long(MAXPIXELS)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        std::usize::MAX,
                        "Could not parse pixel limit",
                        "The pixel limit must be positive",
                    )
                })
                .help("Shrink the panels if the image would hold more pixels than this"),
        )
        .arg(
            Arg::with_name(SOUTHUP)
                .long(SOUTHUP)
                .help("Put the lowest imaginary values at the top of each panel"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> z0mandel::Result<()> {
    let panel = require_size(matches.value_of(PANEL), "panel size")?;
    let grid: usize = require(matches.value_of(GRID), "grid size")?;
    let radius: f64 = require(matches.value_of(Z0RADIUS), "z0 radius")?;
    let leftlower = require_complex(matches.value_of(LEFTLOWER), "left lower corner")?;
    let rightupper = require_complex(matches.value_of(RIGHTUPPER), "right upper corner")?;
    let iterations: u32 = require(matches.value_of(ITERATIONS), "iteration count")?;
    let escape: f64 = require(matches.value_of(ESCAPE), "escape radius")?;
    let palette: Palette = require(matches.value_of(PALETTE), "palette")?;
    let threads = match matches.value_of(THREADS) {
        Some(t) => require(Some(t), "thread count")?,
        None => num_cpus::get(),
    };
    let limits = match matches.value_of(MAXPIXELS) {
        Some(m) => Limits {
            max_pixels: require(Some(m), "pixel limit")?,
        },
        None => Limits::default(),
    };
    let orientation = if matches.is_present(SOUTHUP) {
        Orientation::SouthUp
    } else {
        Orientation::NorthUp
    };

    let seeds = Z0Matrix::grid(grid, radius)?;
    let (width, height) = limits.cap_panel(panel.0, panel.1, seeds.len())?;
    let viewport = Viewport::new(width, height, leftlower, rightupper)?.with_orientation(orientation);
    let params = EscapeParams::new(iterations, escape)?;

    let image = VariantRenderer::new(viewport, params, palette).render(&seeds, threads)?;
    save_rgb(&image, Path::new(matches.value_of(OUTPUT).unwrap_or_default()))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
