// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The set of starting values a batch render sweeps over.

use num::Complex;

use crate::error::{invalid, Result};

/// A rectangular, row-major matrix of z0 values.  Panel (row, col) of
/// a composite render is the variant seeded with `get(row, col)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Z0Matrix {
    rows: usize,
    cols: usize,
    values: Vec<Complex<f64>>,
}

impl Z0Matrix {
    /// Build a matrix from explicit rows.  Fails on an empty matrix,
    /// on rows of differing length and on non-finite values.
    pub fn from_rows(rows: Vec<Vec<Complex<f64>>>) -> Result<Self> {
        let cols = match rows.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(invalid("The z0 matrix is empty")),
        };
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(invalid(format!(
                "The z0 matrix is not rectangular: row {} has {} values, expected {}",
                i,
                row.len(),
                cols
            )));
        }
        let nrows = rows.len();
        let values: Vec<Complex<f64>> = rows.into_iter().flatten().collect();
        if values.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
            return Err(invalid("The z0 matrix holds a non-finite value"));
        }
        Ok(Z0Matrix {
            rows: nrows,
            cols,
            values,
        })
    }

    /// A one-panel matrix.
    pub fn single(z0: Complex<f64>) -> Result<Self> {
        Z0Matrix::from_rows(vec![vec![z0]])
    }

    /// An `n` x `n` sweep of [-radius, radius] on both axes, endpoints
    /// included.  The real part grows left to right and the imaginary
    /// part shrinks top to bottom, so the composite reads like the
    /// z0 plane itself.  A one-panel sweep sits at the origin.
    pub fn grid(n: usize, radius: f64) -> Result<Self> {
        if n == 0 {
            return Err(invalid("The z0 grid needs at least one panel per axis"));
        }
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(invalid(format!(
                "The z0 radius must be a non-negative number, got {}",
                radius
            )));
        }
        let axis: Vec<f64> = if n == 1 {
            vec![0.0]
        } else {
            let step = 2.0 * radius / (n - 1) as f64;
            (0..n).map(|i| -radius + step * i as f64).collect()
        };
        let rows = axis
            .iter()
            .rev()
            .map(|&im| axis.iter().map(|&re| Complex::new(re, im)).collect())
            .collect();
        Z0Matrix::from_rows(rows)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of panels.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; an empty matrix can not be built.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The seed at (row, col), if there is one.
    pub fn get(&self, row: usize, col: usize) -> Option<Complex<f64>> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    /// Every seed in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Complex<f64>> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_matrices() {
        assert!(Z0Matrix::from_rows(vec![]).is_err());
        assert!(Z0Matrix::from_rows(vec![vec![]]).is_err());
    }

    #[test]
    fn rejects_ragged_matrices() {
        let rows = vec![
            vec![Complex::new(0.0, 0.0), Complex::new(1.0, 0.0)],
            vec![Complex::new(0.0, 1.0)],
        ];
        assert!(Z0Matrix::from_rows(rows).is_err());
    }

    #[test]
    fn rejects_non_finite_seeds() {
        assert!(Z0Matrix::single(Complex::new(std::f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn keeps_row_major_order() {
        let m = Z0Matrix::from_rows(vec![
            vec![Complex::new(1.0, 0.0), Complex::new(2.0, 0.0), Complex::new(3.0, 0.0)],
            vec![Complex::new(4.0, 0.0), Complex::new(5.0, 0.0), Complex::new(6.0, 0.0)],
        ])
        .unwrap();
        assert_eq!((m.rows(), m.cols(), m.len()), (2, 3, 6));
        assert_eq!(m.get(1, 0), Some(Complex::new(4.0, 0.0)));
        assert_eq!(m.get(0, 2), Some(Complex::new(3.0, 0.0)));
        assert_eq!(m.get(2, 0), None);
        let res: Vec<f64> = m.iter().map(|z| z.re).collect();
        assert_eq!(res, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn grid_spans_the_radius_north_up() {
        let m = Z0Matrix::grid(3, 3.0).unwrap();
        assert_eq!((m.rows(), m.cols()), (3, 3));
        assert_eq!(m.get(0, 0), Some(Complex::new(-3.0, 3.0)));
        assert_eq!(m.get(1, 1), Some(Complex::new(0.0, 0.0)));
        assert_eq!(m.get(2, 2), Some(Complex::new(3.0, -3.0)));
        assert_eq!(m.get(2, 0), Some(Complex::new(-3.0, -3.0)));
    }

    #[test]
    fn one_panel_grid_is_classical() {
        let m = Z0Matrix::grid(1, 3.0).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(0, 0), Some(Complex::new(0.0, 0.0)));
    }

    #[test]
    fn grid_rejects_bad_arguments() {
        assert!(Z0Matrix::grid(0, 1.0).is_err());
        assert!(Z0Matrix::grid(3, -1.0).is_err());
        assert!(Z0Matrix::grid(3, std::f64::INFINITY).is_err());
    }
}
