#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot variants with a non-zero seed
//!
//! The Mandelbrot set is usually drawn by iterating z -> z^2 + c from
//! z = 0 and asking, for each c, whether the orbit stays bounded.
//! Nothing about the recurrence requires that starting point.  Start
//! from some other z0 and the familiar silhouette distorts, splits,
//! and for seeds far enough out vanishes altogether.
//!
//! This crate renders those variants two ways.  The `render` module
//! tiles one escape-time panel per seed into a matrix, so that the
//! image as a whole is a map of the z0 plane.  The `similarity` module
//! compares a single variant with the classical set pixel by pixel and
//! reduces the comparison to black (alike) and white (not alike); the
//! `session` module wraps that comparison for interactive use, where
//! every change of a control restarts the computation.
//!
//! Both are built from the same two pieces: `planes`, which maps
//! pixels to points on the complex plane, and `escape`, which iterates
//! a single point.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod cli;
pub mod color;
pub mod error;
pub mod escape;
pub mod limits;
pub mod matrix;
pub mod output;
pub mod planes;
pub mod render;
pub mod session;
pub mod similarity;

pub use color::Palette;
pub use error::{Error, Result};
pub use escape::{escape_time, EscapeParams, IterationResult};
pub use matrix::Z0Matrix;
pub use planes::{Orientation, Pixel, Viewport};
pub use render::VariantRenderer;
pub use session::Session;
pub use similarity::{compare, SimilarityConfig, SimilarityMap};
