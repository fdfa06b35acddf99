// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners defining the leftlower and rightupper corners of the
//! region being rendered.
use num::Complex;

use crate::error::{invalid, Error, Result};

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.  For that reason,
/// the lower-left-hand corner is not included.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// Describes the column, row of a pixel in a raster.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// Which way the imaginary axis runs down the raster.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Row 0 is the top of the image and sits next to the upper
    /// imaginary bound, the way the complex plane is drawn on paper.
    /// Images written with this orientation look the right way up.
    NorthUp,
    /// Row 0 sits next to the lower imaginary bound; imaginary values
    /// grow with the row index.
    SouthUp,
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::NorthUp
    }
}

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a complex cartesian plane.  Maps points from one to the other,
/// always through the centre of a pixel.
///
/// A Viewport is an immutable snapshot; the navigation methods return
/// new viewports rather than changing this one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    // The right-upper hand corner of the integral cartesian plane.
    // The left-lower is assumed to be at 0,0
    integral_plane: IntegralPlane,
    // Left-lower and right-upper corners of the complex region.
    complex_plane: ComplexPlane,
    orientation: Orientation,
    // The width and height of one pixel, in complex units.
    pixel_size: (f64, f64),
}

impl Viewport {
    /// Constructor.  Takes the size of the raster and the two corners
    /// of the complex region it covers.  Fails unless the region has
    /// positive, finite extent on both axes and the raster has at
    /// least one pixel, and at most as many as a `usize` can count.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<Viewport> {
        if width == 0 || height == 0 {
            return Err(invalid(format!(
                "Image dimensions must be positive, got {}x{}",
                width, height
            )));
        }

        if width.checked_mul(height).is_none() {
            return Err(Error::TooLarge(format!(
                "{}x{} pixels can not be counted",
                width, height
            )));
        }

        let corners = [leftlower.re, leftlower.im, rightupper.re, rightupper.im];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err(invalid("Viewport bounds must be finite numbers"));
        }

        if rightupper.re <= leftlower.re {
            return Err(invalid(
                "The left lower corner is not to the left of the right upper corner",
            ));
        }

        if rightupper.im <= leftlower.im {
            return Err(invalid(
                "The left lower corner is not lower than the right upper corner",
            ));
        }

        Ok(Viewport {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
            orientation: Orientation::default(),
            pixel_size: (
                (rightupper.re - leftlower.re) / (width as f64),
                (rightupper.im - leftlower.im) / (height as f64),
            ),
        })
    }

    /// The same viewport with the imaginary axis running the other way.
    pub fn with_orientation(mut self, orientation: Orientation) -> Viewport {
        self.orientation = orientation;
        self
    }

    /// Width of the raster, in pixels.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Height of the raster, in pixels.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The left lower corner of the complex region.
    pub fn leftlower(&self) -> Complex<f64> {
        self.complex_plane.0
    }

    /// The right upper corner of the complex region.
    pub fn rightupper(&self) -> Complex<f64> {
        self.complex_plane.1
    }

    /// Direction of the imaginary axis relative to the rows.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Always false; a viewport has at least one pixel.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The extent of one pixel on the real and imaginary axes.
    pub fn pixel_size(&self) -> (f64, f64) {
        self.pixel_size
    }

    /// The midpoint of the complex region.
    pub fn center(&self) -> Complex<f64> {
        (self.complex_plane.0 + self.complex_plane.1) * 0.5
    }

    /// Given a pixel on the integral cartesian plane, return the
    /// complex number at the centre of that pixel.  The pixel is
    /// expected to lie inside the raster; pixels outside it are
    /// extrapolated along the same lines.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let ComplexPlane(leftlower, rightupper) = self.complex_plane;
        let re = leftlower.re + (pixel.0 as f64 + 0.5) * self.pixel_size.0;
        let im = match self.orientation {
            Orientation::NorthUp => rightupper.im - (pixel.1 as f64 + 0.5) * self.pixel_size.1,
            Orientation::SouthUp => leftlower.im + (pixel.1 as f64 + 0.5) * self.pixel_size.1,
        };
        Complex::new(re, im)
    }

    /// As `pixel_to_point`, but refuses pixels outside the raster.
    pub fn pixel_to_point_checked(&self, pixel: &Pixel) -> Option<Complex<f64>> {
        if pixel.0 < self.width() && pixel.1 < self.height() {
            Some(self.pixel_to_point(pixel))
        } else {
            None
        }
    }

    /// Given a complex number corresponding to a location on the
    /// complex cartesian plane, find the pixel that contains it, if
    /// any.  The upper bounds of the region belong to no pixel.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let ComplexPlane(leftlower, rightupper) = self.complex_plane;
        let left = (point.re - leftlower.re) / self.pixel_size.0;
        let top = match self.orientation {
            Orientation::NorthUp => (rightupper.im - point.im) / self.pixel_size.1,
            Orientation::SouthUp => (point.im - leftlower.im) / self.pixel_size.1,
        };
        // Written this way round so that NaN lands outside.
        if !(left >= 0.0 && left < self.width() as f64 && top >= 0.0 && top < self.height() as f64)
        {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }

    /// Scale the region about the point under `pixel`, which stays
    /// under that pixel afterwards.  Factors below 1.0 zoom in.
    pub fn zoom_at(&self, pixel: &Pixel, factor: f64) -> Result<Viewport> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(invalid(format!(
                "Zoom factor must be a positive number, got {}",
                factor
            )));
        }
        let anchor = self.pixel_to_point(pixel);
        let ComplexPlane(leftlower, rightupper) = self.complex_plane;
        self.rebuild(
            self.width(),
            self.height(),
            anchor + (leftlower - anchor) * factor,
            anchor + (rightupper - anchor) * factor,
        )
    }

    /// Scale the region about its centre.
    pub fn zoom(&self, factor: f64) -> Result<Viewport> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(invalid(format!(
                "Zoom factor must be a positive number, got {}",
                factor
            )));
        }
        let center = self.center();
        let ComplexPlane(leftlower, rightupper) = self.complex_plane;
        self.rebuild(
            self.width(),
            self.height(),
            center + (leftlower - center) * factor,
            center + (rightupper - center) * factor,
        )
    }

    /// Move the region so that the point under `pixel` becomes its centre.
    pub fn pan_to(&self, pixel: &Pixel) -> Result<Viewport> {
        let shift = self.pixel_to_point(pixel) - self.center();
        let ComplexPlane(leftlower, rightupper) = self.complex_plane;
        self.rebuild(
            self.width(),
            self.height(),
            leftlower + shift,
            rightupper + shift,
        )
    }

    /// The same complex region sampled at a different resolution.
    pub fn with_size(&self, width: usize, height: usize) -> Result<Viewport> {
        let ComplexPlane(leftlower, rightupper) = self.complex_plane;
        self.rebuild(width, height, leftlower, rightupper)
    }

    fn rebuild(
        &self,
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<Viewport> {
        Ok(Viewport::new(width, height, leftlower, rightupper)?.with_orientation(self.orientation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: usize) -> Viewport {
        Viewport::new(size, size, Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0)).unwrap()
    }

    #[test]
    fn viewport_fails_on_bad_shape() {
        let vp = Viewport::new(4, 4, Complex::new(-1.0, 1.0), Complex::new(1.0, -1.0));
        assert!(vp.is_err());
        let vp = Viewport::new(4, 4, Complex::new(1.0, -1.0), Complex::new(-1.0, 1.0));
        assert!(vp.is_err());
    }

    #[test]
    fn viewport_fails_on_degenerate_region() {
        let vp = Viewport::new(4, 4, Complex::new(1.0, -1.0), Complex::new(1.0, 1.0));
        assert!(vp.is_err());
    }

    #[test]
    fn viewport_fails_on_empty_raster() {
        assert!(Viewport::new(0, 4, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0)).is_err());
        assert!(Viewport::new(4, 0, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn viewport_fails_when_the_pixels_can_not_be_counted() {
        let vp = Viewport::new(
            std::usize::MAX,
            2,
            Complex::new(-1.0, -1.0),
            Complex::new(1.0, 1.0),
        );
        match vp {
            Err(Error::TooLarge(_)) => {}
            other => panic!("expected TooLarge, got {:?}", other),
        }
        let vp = Viewport::new(
            std::usize::MAX,
            1,
            Complex::new(-1.0, -1.0),
            Complex::new(1.0, 1.0),
        );
        assert_eq!(vp.unwrap().len(), std::usize::MAX);
    }

    #[test]
    fn viewport_fails_on_non_finite_bounds() {
        let vp = Viewport::new(4, 4, Complex::new(std::f64::NAN, -1.0), Complex::new(1.0, 1.0));
        assert!(vp.is_err());
        let vp = Viewport::new(
            4,
            4,
            Complex::new(-1.0, -1.0),
            Complex::new(std::f64::INFINITY, 1.0),
        );
        assert!(vp.is_err());
    }

    #[test]
    fn viewport_passes_on_good_shape() {
        let vp = square(4);
        assert_eq!(vp.len(), 16);
        assert!(!vp.is_empty());
        assert_eq!(vp.pixel_size(), (1.0, 1.0));
        assert_eq!(vp.orientation(), Orientation::NorthUp);
        assert_eq!(vp.leftlower(), Complex::new(-2.0, -2.0));
        assert_eq!(vp.rightupper(), Complex::new(2.0, 2.0));
    }

    #[test]
    fn pixel_to_point_uses_pixel_centres() {
        let vp = square(4);
        assert_eq!(vp.pixel_to_point(&Pixel(0, 0)), Complex::new(-1.5, 1.5));
        assert_eq!(vp.pixel_to_point(&Pixel(2, 2)), Complex::new(0.5, -0.5));
        assert_eq!(vp.pixel_to_point(&Pixel(3, 3)), Complex::new(1.5, -1.5));
    }

    #[test]
    fn pixel_to_point_south_up() {
        let vp = square(4).with_orientation(Orientation::SouthUp);
        assert_eq!(vp.pixel_to_point(&Pixel(0, 0)), Complex::new(-1.5, -1.5));
        assert_eq!(vp.pixel_to_point(&Pixel(3, 3)), Complex::new(1.5, 1.5));
    }

    #[test]
    fn corner_pixels_lie_within_a_pixel_of_the_corners() {
        let vp = Viewport::new(400, 300, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap();
        let (dx, dy) = vp.pixel_size();

        let first = vp.pixel_to_point(&Pixel(0, 0));
        assert!((first.re - -2.0).abs() <= dx);
        assert!((first.im - 1.5).abs() <= dy);

        let last = vp.pixel_to_point(&Pixel(399, 299));
        assert!((last.re - 1.0).abs() <= dx);
        assert!((last.im - -1.5).abs() <= dy);
    }

    #[test]
    fn checked_mapping_refuses_pixels_outside_the_raster() {
        let vp = square(4);
        assert!(vp.pixel_to_point_checked(&Pixel(3, 3)).is_some());
        assert!(vp.pixel_to_point_checked(&Pixel(4, 0)).is_none());
        assert!(vp.pixel_to_point_checked(&Pixel(0, 4)).is_none());
    }

    #[test]
    fn point_to_pixel_on_mixed_planes() {
        let vp = square(4);
        assert_eq!(vp.point_to_pixel(&Complex::new(0.0, 0.0)), Some(Pixel(2, 2)));
        assert_eq!(vp.point_to_pixel(&Complex::new(-2.0, 2.0)), Some(Pixel(0, 0)));
        assert_eq!(vp.point_to_pixel(&Complex::new(-1.9, -1.9)), Some(Pixel(0, 3)));
        assert_eq!(vp.point_to_pixel(&Complex::new(2.0, 0.0)), None);
        assert_eq!(vp.point_to_pixel(&Complex::new(0.0, -2.5)), None);
        assert_eq!(vp.point_to_pixel(&Complex::new(std::f64::NAN, 0.0)), None);
    }

    #[test]
    fn point_to_pixel_inverts_pixel_to_point_on_large_planes() {
        let vp = Viewport::new(640, 480, Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5)).unwrap();
        for &p in &[Pixel(0, 0), Pixel(320, 240), Pixel(639, 479), Pixel(17, 401)] {
            assert_eq!(vp.point_to_pixel(&vp.pixel_to_point(&p)), Some(p));
        }
    }

    #[test]
    fn zoom_at_keeps_the_anchor_under_its_pixel() {
        let vp = square(4).zoom_at(&Pixel(2, 2), 0.5).unwrap();
        assert_eq!(vp.leftlower(), Complex::new(-0.75, -1.25));
        assert_eq!(vp.rightupper(), Complex::new(1.25, 0.75));
        assert_eq!(vp.pixel_to_point(&Pixel(2, 2)), Complex::new(0.5, -0.5));
    }

    #[test]
    fn zoom_rejects_nonsense_factors() {
        assert!(square(4).zoom(0.0).is_err());
        assert!(square(4).zoom(-2.0).is_err());
        assert!(square(4).zoom_at(&Pixel(0, 0), std::f64::NAN).is_err());
    }

    #[test]
    fn zoom_about_the_centre() {
        let vp = square(4).zoom(0.5).unwrap();
        assert_eq!(vp.leftlower(), Complex::new(-1.0, -1.0));
        assert_eq!(vp.rightupper(), Complex::new(1.0, 1.0));
    }

    #[test]
    fn pan_to_recentres_on_the_pixel() {
        let vp = square(4).pan_to(&Pixel(3, 0)).unwrap();
        assert_eq!(vp.center(), Complex::new(1.5, 1.5));
        assert_eq!(vp.pixel_size(), (1.0, 1.0));
    }

    #[test]
    fn navigation_keeps_orientation() {
        let vp = square(4).with_orientation(Orientation::SouthUp);
        assert_eq!(vp.zoom(2.0).unwrap().orientation(), Orientation::SouthUp);
        assert_eq!(
            vp.pan_to(&Pixel(1, 1)).unwrap().orientation(),
            Orientation::SouthUp
        );
        assert_eq!(vp.with_size(8, 2).unwrap().orientation(), Orientation::SouthUp);
    }

    #[test]
    fn with_size_keeps_the_region() {
        let vp = square(4).with_size(8, 2).unwrap();
        assert_eq!(vp.leftlower(), square(4).leftlower());
        assert_eq!(vp.rightupper(), square(4).rightupper());
        assert_eq!(vp.pixel_size(), (0.5, 2.0));
        assert!(square(4).with_size(0, 2).is_err());
    }
}
