// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Soft caps on how much we are willing to render.  A request that is
//! merely too big is scaled down with a warning; only a request whose
//! pixel count can not even be represented is refused.

use log::warn;

use crate::error::{Error, Result};
use crate::planes::Viewport;

/// Default ceiling on the pixels in one output image: 64 megapixels,
/// or 192MB of RGB.
pub const DEFAULT_MAX_PIXELS: usize = 64 * 1024 * 1024;

/// Size ceilings for a render request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    /// The largest number of pixels one output image may hold.
    pub max_pixels: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

/// Multiply out a raster size, failing rather than wrapping.
pub fn pixel_count(width: usize, height: usize, panels: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(panels))
        .ok_or_else(|| {
            Error::TooLarge(format!(
                "{} panels of {}x{} pixels overflow the address space",
                panels, width, height
            ))
        })
}

impl Limits {
    /// Fit `panels` panels of `width` x `height` under the pixel cap.
    /// Returns the panel size to actually render: unchanged when it
    /// fits, otherwise shrunk by a common factor (never below 1x1).
    pub fn cap_panel(&self, width: usize, height: usize, panels: usize) -> Result<(usize, usize)> {
        let requested = pixel_count(width, height, panels)?;
        if requested <= self.max_pixels {
            return Ok((width, height));
        }
        let scale = (self.max_pixels as f64 / requested as f64).sqrt();
        let mut capped = (
            ((width as f64 * scale) as usize).max(1),
            ((height as f64 * scale) as usize).max(1),
        );
        // Rounding can leave us a pixel over; shave the longer side.
        while capped.0 * capped.1 * panels > self.max_pixels && (capped.0 > 1 || capped.1 > 1) {
            if capped.0 >= capped.1 {
                capped.0 -= 1;
            } else {
                capped.1 -= 1;
            }
        }
        warn!(
            "Requested {} panel(s) of {}x{} ({} pixels) exceeds the limit of {} pixels; rendering {}x{} panels instead",
            panels, width, height, requested, self.max_pixels, capped.0, capped.1
        );
        Ok(capped)
    }

    /// The same region at a resolution that fits under the cap.
    pub fn cap_viewport(&self, viewport: &Viewport) -> Result<Viewport> {
        let (width, height) = self.cap_panel(viewport.width(), viewport.height(), 1)?;
        if (width, height) == (viewport.width(), viewport.height()) {
            return Ok(*viewport);
        }
        viewport.with_size(width, height)
    }
}
