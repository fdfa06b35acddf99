// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing finished images.  The encoder is chosen from the file
//! extension, so `mandel.png` is a PNG and `mandel.pgm` a binary
//! graymap.

use image::{GrayImage, ImageFormat, RgbImage};
use log::info;
use std::path::Path;

use crate::error::{Error, Result};

fn target_error(path: &Path, error: image::ImageError) -> Error {
    Error::RenderTarget {
        path: path.display().to_string(),
        error,
    }
}

fn format_for(path: &Path) -> Result<ImageFormat> {
    ImageFormat::from_path(path).map_err(|e| target_error(path, e))
}

/// Write a color image.
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    let format = format_for(path)?;
    image
        .save_with_format(path, format)
        .map_err(|e| target_error(path, e))?;
    info!(
        "Wrote {}x{} {:?} image to {}",
        image.width(),
        image.height(),
        format,
        path.display()
    );
    Ok(())
}

/// Write a grayscale image.
pub fn save_gray(image: &GrayImage, path: &Path) -> Result<()> {
    let format = format_for(path)?;
    image
        .save_with_format(path, format)
        .map_err(|e| target_error(path, e))?;
    info!(
        "Wrote {}x{} {:?} image to {}",
        image.width(),
        image.height(),
        format,
        path.display()
    );
    Ok(())
}
