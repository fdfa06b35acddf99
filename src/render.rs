// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The matrix renderer.  Takes one viewport and a matrix of seeds, and
//! produces a composite image in which each tile is the escape-time
//! picture of the Mandelbrot variant started from that tile's seed.
//!
//! Every pixel of the composite is a pure function of its coordinates
//! and the renderer's configuration, so the work is divided up by
//! composite row: worker threads pull rows off a shared iterator and
//! fill them in place.  No two workers ever see the same row, and the
//! result is the same whatever the thread count.

use image::{Rgb, RgbImage};
use itertools::iproduct;
use log::{debug, info};
use num::Complex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use crate::color::Palette;
use crate::error::{Error, Result};
use crate::escape::{escape_time, EscapeParams, IterationResult};
use crate::matrix::Z0Matrix;
use crate::planes::{Pixel, Viewport};

/// How many progress lines a render logs.
const PROGRESS_STEPS: usize = 10;

// Counts finished composite rows across workers.
struct Progress {
    done: AtomicUsize,
    total: usize,
    step: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Progress {
            done: AtomicUsize::new(0),
            total,
            step: (total / PROGRESS_STEPS).max(1),
        }
    }

    // Records one row; returns the count when it is worth reporting.
    fn row_done(&self) -> Option<usize> {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        if done % self.step == 0 || done == self.total {
            Some(done)
        } else {
            None
        }
    }
}

/// Renders grids of z0 variants over a common viewport.  The viewport
/// gives the size of a single panel.
#[derive(Copy, Clone, Debug)]
pub struct VariantRenderer {
    viewport: Viewport,
    params: EscapeParams,
    palette: Palette,
}

impl VariantRenderer {
    /// All three parts are validated when they are built, so this can
    /// not fail.
    pub fn new(viewport: Viewport, params: EscapeParams, palette: Palette) -> Self {
        VariantRenderer {
            viewport,
            params,
            palette,
        }
    }

    /// The per-panel viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The iteration parameters.
    pub fn params(&self) -> &EscapeParams {
        &self.params
    }

    /// The colormap.
    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Width and height of the composite for `seeds`.  Fails if it
    /// would not fit in an image.
    pub fn composite_size(&self, seeds: &Z0Matrix) -> Result<(u32, u32)> {
        let too_large = || {
            Error::TooLarge(format!(
                "{}x{} panels of {}x{} pixels",
                seeds.cols(),
                seeds.rows(),
                self.viewport.width(),
                self.viewport.height()
            ))
        };
        let width = self
            .viewport
            .width()
            .checked_mul(seeds.cols())
            .ok_or_else(too_large)?;
        let height = self
            .viewport
            .height()
            .checked_mul(seeds.rows())
            .ok_or_else(too_large)?;
        if width > u32::max_value() as usize || height > u32::max_value() as usize {
            return Err(too_large());
        }
        Ok((width as u32, height as u32))
    }

    /// Raw escape results for one seed, row by row.
    pub fn escape_panel(&self, z0: Complex<f64>) -> Vec<IterationResult> {
        iproduct!(0..self.viewport.height(), 0..self.viewport.width())
            .map(|(row, column)| {
                let c = self.viewport.pixel_to_point(&Pixel(column, row));
                escape_time(c, z0, &self.params)
            })
            .collect()
    }

    /// One panel, colored.
    pub fn render_panel(&self, z0: Complex<f64>) -> RgbImage {
        let max = self.params.max_iterations();
        let width = self.viewport.width();
        let results = self.escape_panel(z0);
        RgbImage::from_fn(width as u32, self.viewport.height() as u32, |x, y| {
            self.palette
                .color(results[y as usize * width + x as usize], max)
        })
    }

    /// The color of composite pixel (x, y): locate the panel, look up
    /// its seed, and iterate the point under the pixel's position
    /// within the panel.  `None` outside the composite.
    pub fn composite_pixel(&self, x: usize, y: usize, seeds: &Z0Matrix) -> Option<Rgb<u8>> {
        let (pw, ph) = (self.viewport.width(), self.viewport.height());
        let z0 = seeds.get(y / ph, x / pw)?;
        let c = self.viewport.pixel_to_point(&Pixel(x % pw, y % ph));
        let result = escape_time(c, z0, &self.params);
        Some(self.palette.color(result, self.params.max_iterations()))
    }

    /// Render every variant in `seeds` into one tiled image, using up
    /// to `threads` worker threads.
    pub fn render(&self, seeds: &Z0Matrix, threads: usize) -> Result<RgbImage> {
        let (width, height) = self.composite_size(seeds)?;
        let threads = threads.max(1).min(height as usize);
        let row_len = width as usize * 3;
        let mut buffer = vec![0 as u8; row_len * height as usize];
        let started = Instant::now();
        let progress = Progress::new(height as usize);

        {
            let rows = Mutex::new(buffer.chunks_mut(row_len).enumerate());
            let rows = &rows;
            let progress = &progress;
            crossbeam::scope(|spawner| {
                for worker in 0..threads {
                    spawner.spawn(move |_| {
                        let mut done = 0;
                        loop {
                            // A poisoned lock means a sibling panicked;
                            // the scope reports that, we just stop.
                            let next = match rows.lock() {
                                Ok(mut rows) => rows.next(),
                                Err(_) => None,
                            };
                            let (y, row) = match next {
                                Some(next) => next,
                                None => break,
                            };
                            for (x, pixel) in row.chunks_mut(3).enumerate() {
                                if let Some(Rgb(rgb)) = self.composite_pixel(x, y, seeds) {
                                    pixel.copy_from_slice(&rgb);
                                }
                            }
                            done += 1;
                            if let Some(finished) = progress.row_done() {
                                info!(
                                    "Rendered {} of {} rows ({} panel rows) after {:.2?}",
                                    finished,
                                    progress.total,
                                    seeds.rows(),
                                    started.elapsed()
                                );
                            }
                        }
                        debug!("Worker {} rendered {} rows", worker, done);
                    });
                }
            })
            .map_err(|_| Error::WorkerPanic)?;
        }

        info!(
            "Rendered {}x{} variants ({}x{} pixels, {} iterations max) on {} thread(s) in {:.2?}",
            seeds.cols(),
            seeds.rows(),
            width,
            height,
            self.params.max_iterations(),
            threads,
            started.elapsed()
        );

        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| Error::TooLarge(format!("{}x{} composite", width, height)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::IN_SET;
    use crate::escape::ORIGIN;

    fn classical_view(width: usize, height: usize) -> Viewport {
        Viewport::new(width, height, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap()
    }

    fn renderer(width: usize, height: usize) -> VariantRenderer {
        VariantRenderer::new(
            classical_view(width, height),
            EscapeParams::new(100, 2.0).unwrap(),
            Palette::Grayscale,
        )
    }

    #[test]
    fn classical_silhouette_appears() {
        let r = renderer(400, 300);
        let results = r.escape_panel(ORIGIN);
        let vp = r.viewport();

        let inside = vp.point_to_pixel(&Complex::new(-1.0, 0.0)).unwrap();
        assert!(!results[inside.1 * 400 + inside.0].escaped);

        let cardioid = vp.point_to_pixel(&Complex::new(-0.1, 0.1)).unwrap();
        assert!(!results[cardioid.1 * 400 + cardioid.0].escaped);

        // Top right corner of the view, the nearest we get to (2, 2).
        assert!(results[399].escaped);
        assert!(results[0].escaped);

        let bounded = results.iter().filter(|r| !r.escaped).count();
        assert!(bounded > 0 && bounded < results.len());
    }

    #[test]
    fn panel_colors_follow_the_escape_results() {
        let r = renderer(30, 20);
        let panel = r.render_panel(ORIGIN);
        let results = r.escape_panel(ORIGIN);
        assert_eq!(panel.dimensions(), (30, 20));
        for (i, result) in results.iter().enumerate() {
            let pixel = panel.get_pixel((i % 30) as u32, (i / 30) as u32);
            assert_eq!(*pixel, Palette::Grayscale.color(*result, 100));
            assert_eq!(*pixel == IN_SET, !result.escaped);
        }
    }

    #[test]
    fn composite_places_panels_in_row_major_order() {
        let r = renderer(12, 9);
        let far = Complex::new(5.0, 0.0);
        let seeds = Z0Matrix::from_rows(vec![vec![ORIGIN, far], vec![far, ORIGIN]]).unwrap();
        let image = r.render(&seeds, 2).unwrap();
        assert_eq!(image.dimensions(), (24, 18));

        let classical = r.render_panel(ORIGIN);
        let escaped = r.render_panel(far);
        let white = Rgb([255, 255, 255]);
        for y in 0..9 {
            for x in 0..12 {
                assert_eq!(image.get_pixel(x, y), classical.get_pixel(x, y));
                assert_eq!(image.get_pixel(x + 12, y), escaped.get_pixel(x, y));
                assert_eq!(*image.get_pixel(x + 12, y), white);
                assert_eq!(*image.get_pixel(x, y + 9), white);
                assert_eq!(image.get_pixel(x + 12, y + 9), classical.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn thread_count_does_not_change_the_image() {
        let r = renderer(16, 12);
        let seeds = Z0Matrix::grid(3, 1.0).unwrap();
        let single = r.render(&seeds, 1).unwrap();
        for &threads in &[2, 3, 8, 1000] {
            assert_eq!(r.render(&seeds, threads).unwrap(), single);
        }
        assert_eq!(r.render(&seeds, 0).unwrap(), single);
    }

    #[test]
    fn progress_reports_a_few_times_and_at_the_end() {
        let progress = Progress::new(95);
        let reported: Vec<usize> = (0..95).filter_map(|_| progress.row_done()).collect();
        assert_eq!(reported.len(), 11);
        assert_eq!(reported[0], 9);
        assert_eq!(reported.last(), Some(&95));

        let tiny = Progress::new(3);
        let reported: Vec<usize> = (0..3).filter_map(|_| tiny.row_done()).collect();
        assert_eq!(reported, vec![1, 2, 3]);
    }

    #[test]
    fn composite_pixel_is_none_outside_the_composite() {
        let r = renderer(4, 4);
        let seeds = Z0Matrix::single(ORIGIN).unwrap();
        assert!(r.composite_pixel(3, 3, &seeds).is_some());
        assert!(r.composite_pixel(4, 0, &seeds).is_none());
        assert!(r.composite_pixel(0, 4, &seeds).is_none());
    }

    #[test]
    fn composite_size_must_fit_an_image() {
        let r = VariantRenderer::new(
            Viewport::new(
                1 << 20,
                1,
                Complex::new(-2.0, -1.5),
                Complex::new(1.0, 1.5),
            )
            .unwrap(),
            EscapeParams::default(),
            Palette::Turbo,
        );
        let seeds = Z0Matrix::from_rows(vec![vec![ORIGIN; 8192]]).unwrap();
        assert!(r.composite_size(&seeds).is_err());
    }
}
