// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.  Everything else in the crate is a way of
//! deciding which points to feed to `escape_time` and what to do with
//! the answers.

use num::Complex;

use crate::error::{invalid, Result};

/// The classical seed.  With this z0 the kernel computes the ordinary
/// Mandelbrot set.
pub const ORIGIN: Complex<f64> = Complex { re: 0.0, im: 0.0 };

/// The two knobs of the iteration: how long we are willing to wait
/// for an orbit to leave, and how far away counts as gone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeParams {
    max_iterations: u32,
    escape_radius: f64,
    // Compared against |z|^2 so the loop never takes a square root.
    radius_sqr: f64,
}

impl EscapeParams {
    /// Fails unless `max_iterations` is at least one and the radius
    /// is a positive, finite number.
    pub fn new(max_iterations: u32, escape_radius: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(invalid("The iteration limit must be at least 1"));
        }
        if !(escape_radius.is_finite() && escape_radius > 0.0) {
            return Err(invalid(format!(
                "The escape radius must be a positive number, got {}",
                escape_radius
            )));
        }
        Ok(EscapeParams {
            max_iterations,
            escape_radius,
            radius_sqr: escape_radius * escape_radius,
        })
    }

    /// The iteration cap.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// The bound on |z| past which an orbit has escaped.
    pub fn escape_radius(&self) -> f64 {
        self.escape_radius
    }
}

impl Default for EscapeParams {
    /// One hundred iterations against the conventional radius of 2.
    fn default() -> Self {
        EscapeParams {
            max_iterations: 100,
            escape_radius: 2.0,
            radius_sqr: 4.0,
        }
    }
}

/// What happened to one orbit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IterationResult {
    /// Whether |z| exceeded the escape radius within the cap.
    pub escaped: bool,
    /// The step at which the orbit was first seen outside the radius,
    /// or the cap itself when it never was.
    pub iterations: u32,
}

impl IterationResult {
    /// An orbit that escaped at step `iterations`.
    pub fn escaped_at(iterations: u32) -> Self {
        IterationResult {
            escaped: true,
            iterations,
        }
    }

    /// An orbit that was still bounded after `max_iterations` steps.
    pub fn bounded(max_iterations: u32) -> Self {
        IterationResult {
            escaped: false,
            iterations: max_iterations,
        }
    }
}

/// Iterate z -> z^2 + c from `z0`.  The magnitude test precedes each
/// update, so a seed already outside the radius escapes at step 0 and
/// the orbit of the classical seed can escape no earlier than step 1.
#[inline]
pub fn escape_time(c: Complex<f64>, z0: Complex<f64>, params: &EscapeParams) -> IterationResult {
    let mut z = z0;
    for i in 0..params.max_iterations {
        if z.norm_sqr() > params.radius_sqr {
            return IterationResult::escaped_at(i);
        }
        z = z * z + c;
    }
    IterationResult::bounded(params.max_iterations)
}

/// `escape_time` for the classical set.
#[inline]
pub fn classical(c: Complex<f64>, params: &EscapeParams) -> IterationResult {
    escape_time(c, ORIGIN, params)
}
