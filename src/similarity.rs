// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Compares a z0 variant with the classical Mandelbrot set, pixel by
//! pixel, and reduces the comparison to a black and white map.
//!
//! The score for one pixel compares the two escape results:
//!
//! * both orbits bounded: 1.0
//! * one escaped, the other did not: 0.0
//! * both escaped: 1.0 - |difference in iterations| / max_iterations
//!
//! Two escaped orbits differ by fewer than `max_iterations` steps, so
//! their score never drops to 0.0; only a disagreement about escaping
//! at all scores that low.  A pixel is similar when its score reaches
//! the threshold.

use image::{GrayImage, Luma};
use log::{debug, info};
use num::Complex;
use std::sync::Mutex;
use std::time::Instant;

use crate::error::{invalid, Error, Result};
use crate::escape::{classical, escape_time, EscapeParams, IterationResult};
use crate::planes::{Pixel, Viewport};
use crate::session::CancelToken;

/// The best possible score; the score of a pixel against itself.
pub const MAX_SCORE: f64 = 1.0;

/// The score of a pixel whose escape status differs from the baseline.
pub const MIN_SCORE: f64 = 0.0;

/// Color of a similar pixel.
pub const SIMILAR: Luma<u8> = Luma([0]);

/// Color of a dissimilar pixel.
pub const DISSIMILAR: Luma<u8> = Luma([255]);

/// A complete, immutable description of one similarity map.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimilarityConfig {
    /// Region and resolution of the map.
    pub viewport: Viewport,
    /// The seed compared against the classical set.
    pub z0: Complex<f64>,
    /// Iteration cap and escape radius, shared by both orbits.
    pub params: EscapeParams,
    /// Minimum score for a pixel to count as similar, in [0, 1].
    pub threshold: f64,
}

impl SimilarityConfig {
    /// Builds and validates a configuration.
    pub fn new(
        viewport: Viewport,
        z0: Complex<f64>,
        params: EscapeParams,
        threshold: f64,
    ) -> Result<Self> {
        let config = SimilarityConfig {
            viewport,
            z0,
            params,
            threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// The viewport and parameters validate themselves on
    /// construction; this covers what they can't.
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold >= MIN_SCORE && self.threshold <= MAX_SCORE) {
            return Err(invalid(format!(
                "The similarity threshold must lie in [{}, {}], got {}",
                MIN_SCORE, MAX_SCORE, self.threshold
            )));
        }
        if !(self.z0.re.is_finite() && self.z0.im.is_finite()) {
            return Err(invalid("z0 must be a finite complex number"));
        }
        Ok(())
    }

    /// Whether the pixel at `pixel` is similar to the classical set.
    pub fn is_similar(&self, pixel: &Pixel) -> bool {
        let c = self.viewport.pixel_to_point(pixel);
        let baseline = classical(c, &self.params);
        let variant = escape_time(c, self.z0, &self.params);
        score(baseline, variant, self.params.max_iterations()) >= self.threshold
    }
}

/// How alike two escape results are, from `MIN_SCORE` to `MAX_SCORE`.
pub fn score(baseline: IterationResult, variant: IterationResult, max_iterations: u32) -> f64 {
    match (baseline.escaped, variant.escaped) {
        (false, false) => MAX_SCORE,
        (true, true) => {
            let diff = if baseline.iterations > variant.iterations {
                baseline.iterations - variant.iterations
            } else {
                variant.iterations - baseline.iterations
            };
            MAX_SCORE - f64::from(diff) / f64::from(max_iterations.max(1))
        }
        _ => MIN_SCORE,
    }
}

/// A binary raster: for each pixel, similar or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimilarityMap {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl SimilarityMap {
    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The classification of one pixel; `None` outside the map.
    pub fn is_similar(&self, pixel: &Pixel) -> Option<bool> {
        if pixel.0 < self.width && pixel.1 < self.height {
            Some(self.cells[pixel.1 * self.width + pixel.0])
        } else {
            None
        }
    }

    /// Number of similar pixels.
    pub fn similar_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Share of the map that is similar, from 0 to 1.
    pub fn similar_fraction(&self) -> f64 {
        self.similar_count() as f64 / self.cells.len() as f64
    }

    /// Similar pixels black, the rest white.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            if self.cells[y as usize * self.width + x as usize] {
                SIMILAR
            } else {
                DISSIMILAR
            }
        })
    }
}

/// Compute the whole map on up to `threads` threads.
pub fn compare(config: &SimilarityConfig, threads: usize) -> Result<SimilarityMap> {
    compare_cancellable(config, threads, &CancelToken::never())?
        .ok_or_else(|| invalid("An uncancellable comparison was cancelled"))
}

/// Compute the whole map, giving up as soon as `token` reports a newer
/// request.  Returns `Ok(None)` when the result was abandoned; a
/// partial map is never returned.
pub fn compare_cancellable(
    config: &SimilarityConfig,
    threads: usize,
    token: &CancelToken,
) -> Result<Option<SimilarityMap>> {
    config.validate()?;
    let (width, height) = (config.viewport.width(), config.viewport.height());
    let threads = threads.max(1).min(height);
    let mut cells = vec![false; config.viewport.len()];
    let started = Instant::now();

    {
        let rows = Mutex::new(cells.chunks_mut(width).enumerate());
        let rows = &rows;
        crossbeam::scope(|spawner| {
            for worker in 0..threads {
                spawner.spawn(move |_| {
                    let mut done = 0;
                    while !token.is_cancelled() {
                        let next = match rows.lock() {
                            Ok(mut rows) => rows.next(),
                            Err(_) => None,
                        };
                        let (y, row) = match next {
                            Some(next) => next,
                            None => break,
                        };
                        for (x, cell) in row.iter_mut().enumerate() {
                            *cell = config.is_similar(&Pixel(x, y));
                        }
                        done += 1;
                    }
                    debug!("Worker {} compared {} rows", worker, done);
                });
            }
        })
        .map_err(|_| Error::WorkerPanic)?;
    }

    if token.is_cancelled() {
        debug!(
            "Abandoned similarity map for generation {} after {:.2?}",
            token.generation(),
            started.elapsed()
        );
        return Ok(None);
    }

    let map = SimilarityMap {
        width,
        height,
        cells,
    };
    info!(
        "Compared z0 = {} against the classical set at {}x{} (threshold {}): {:.1}% similar in {:.2?}",
        config.z0,
        width,
        height,
        config.threshold,
        map.similar_fraction() * 100.0,
        started.elapsed()
    );
    Ok(Some(map))
}
