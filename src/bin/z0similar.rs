// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate log;
extern crate num_cpus;
extern crate z0mandel;

use clap::{App, Arg, ArgMatches};
use log::info;
use std::path::Path;
use z0mandel::cli::{
    require, require_complex, require_size, validate_pair, validate_positive, validate_range,
};
use z0mandel::limits::Limits;
use z0mandel::{EscapeParams, Orientation, Session, SimilarityConfig, Viewport};

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const Z0: &str = "z0";
const THRESHOLD: &str = "threshold";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const ESCAPE: &str = "escape-radius";
const THREADS: &str = "threads";
const MAXPIXELS: &str = "max-pixels";
const SOUTHUP: &str = "south-up";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("z0similar")
        .version("0.1.0")
        .about("Maps where a Mandelbrot variant with seed z0 behaves like the classical set")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the extension picks the format (png, pgm, bmp, ...)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("400x300")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse image size"))
                .help("Size of the map, in pixels"),
        )
        .arg(
            Arg::with_name(Z0)
                .long(Z0)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.0,0.0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse z0"))
                .help("Starting value of the variant, as re,im"),
        )
        .arg(
            Arg::with_name(THRESHOLD)
                .long(THRESHOLD)
                .short("T")
                .takes_value(true)
                .default_value("0.9")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1.0,
                        "Could not parse threshold",
                        "The threshold must be between 0 and 1",
                    )
                })
                .help("Minimum score for a pixel to count as similar"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the c plane"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the c plane"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .takes_value(true)
                .validator(|s| validate_positive(&s, "The zoom factor must be a positive number"))
                .help("Magnify the region about its centre by this factor"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
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
                .help("Number of threads to use [default: all cores]"),
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
                .help("Shrink the map if it would hold more pixels than this"),
        )
        .arg(
            Arg::with_name(SOUTHUP)
                .long(SOUTHUP)
                .help("Put the lowest imaginary values at the top of the map"),
        )
        .get_matches()
}

fn limits(matches: &ArgMatches) -> z0mandel::Result<Limits> {
    Ok(match matches.value_of(MAXPIXELS) {
        Some(m) => Limits {
            max_pixels: require(Some(m), "pixel limit")?,
        },
        None => Limits::default(),
    })
}

fn config(matches: &ArgMatches) -> z0mandel::Result<SimilarityConfig> {
    let size = require_size(matches.value_of(SIZE), "image size")?;
    let z0 = require_complex(matches.value_of(Z0), "z0")?;
    let threshold: f64 = require(matches.value_of(THRESHOLD), "threshold")?;
    let leftlower = require_complex(matches.value_of(LEFTLOWER), "left lower corner")?;
    let rightupper = require_complex(matches.value_of(RIGHTUPPER), "right upper corner")?;
    let iterations: u32 = require(matches.value_of(ITERATIONS), "iteration count")?;
    let escape: f64 = require(matches.value_of(ESCAPE), "escape radius")?;
    let orientation = if matches.is_present(SOUTHUP) {
        Orientation::SouthUp
    } else {
        Orientation::NorthUp
    };

    let mut viewport =
        Viewport::new(size.0, size.1, leftlower, rightupper)?.with_orientation(orientation);
    if let Some(zoom) = matches.value_of(ZOOM) {
        let zoom: f64 = require(Some(zoom), "zoom factor")?;
        viewport = viewport.zoom(1.0 / zoom)?;
    }
    let params = EscapeParams::new(iterations, escape)?;
    SimilarityConfig::new(viewport, z0, params, threshold)
}

fn run(matches: &ArgMatches) -> z0mandel::Result<()> {
    let threads = match matches.value_of(THREADS) {
        Some(t) => require(Some(t), "thread count")?,
        None => num_cpus::get(),
    };
    // The session shrinks the map to fit the limit.
    let mut session = Session::new(threads).with_limits(limits(matches)?);
    session.request(config(matches)?)?;
    let fraction = session.wait()?.similar_fraction();
    info!("{:.1}% of the map is similar to the classical set", fraction * 100.0);
    session.export(Path::new(matches.value_of(OUTPUT).unwrap_or_default()))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
