// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Argument parsing shared by the command line front ends.  The
//! `validate_*` functions have the shape clap wants for its
//! `validator` hooks; the `parse_*` functions turn the validated
//! strings into values.

use num::Complex;
use std::str::FromStr;

use crate::error::{invalid, Result};

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (
            T::from_str(s[..index].trim()),
            T::from_str(s[index + 1..].trim()),
        ) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// A specific implementation of parse_pair using a comma and expecting
/// floating point numbers.
pub fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

/// Parse a `WIDTHxHEIGHT` size.
pub fn parse_size(s: &str) -> Option<(usize, usize)> {
    parse_pair(s, 'x')
}

/// `parse_complex` for an argument that must be present, naming the
/// argument when it is not parseable.
pub fn require_complex(s: Option<&str>, what: &str) -> Result<Complex<f64>> {
    s.and_then(parse_complex)
        .ok_or_else(|| invalid(format!("Could not parse {}", what)))
}

/// `parse_size` for an argument that must be present.
pub fn require_size(s: Option<&str>, what: &str) -> Result<(usize, usize)> {
    s.and_then(parse_size)
        .ok_or_else(|| invalid(format!("Could not parse {}", what)))
}

/// `FromStr` for an argument that must be present.
pub fn require<T: FromStr>(s: Option<&str>, what: &str) -> Result<T> {
    s.and_then(|s| T::from_str(s.trim()).ok())
        .ok_or_else(|| invalid(format!("Could not parse {}", what)))
}

/// Validator for separated pairs.
pub fn validate_pair<T: FromStr>(
    s: &str,
    separator: char,
    err: &str,
) -> std::result::Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

/// Validator for values that must fall within [low, high].
pub fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> std::result::Result<(), String> {
    match T::from_str(s.trim()) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

/// Validator for strictly positive, finite numbers.
pub fn validate_positive(s: &str, err: &str) -> std::result::Result<(), String> {
    match f64::from_str(s.trim()) {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs() {
        assert_eq!(parse_pair::<i32>("10,20", ','), Some((10, 20)));
        assert_eq!(parse_pair::<i32>("10,", ','), None);
        assert_eq!(parse_pair::<i32>(",10", ','), None);
        assert_eq!(parse_pair::<i32>("10,20xy", ','), None);
        assert_eq!(parse_pair::<f64>("0.5x", 'x'), None);
        assert_eq!(parse_pair::<f64>("0.5x1.5", 'x'), Some((0.5, 1.5)));
    }

    #[test]
    fn parses_complex_numbers() {
        assert_eq!(parse_complex("1.25,-0.0625"), Some(Complex::new(1.25, -0.0625)));
        assert_eq!(parse_complex("-2, -1.5"), Some(Complex::new(-2.0, -1.5)));
        assert_eq!(parse_complex(",-0.0625"), None);
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("800x600"), Some((800, 600)));
        assert_eq!(parse_size("800x-600"), None);
        assert_eq!(parse_size("800,600"), None);
    }

    #[test]
    fn required_values_name_the_argument() {
        let e = require_complex(None, "z0").unwrap_err();
        assert_eq!(format!("{}", e), "Invalid configuration: Could not parse z0");
        assert_eq!(require::<u32>(Some("17"), "iterations").unwrap(), 17);
        assert!(require::<u32>(Some("-1"), "iterations").is_err());
        assert_eq!(require_size(Some("3x2"), "size").unwrap(), (3, 2));
    }

    #[test]
    fn validates_ranges() {
        assert!(validate_range("5", 1, 10, "nan", "range").is_ok());
        assert_eq!(validate_range("11", 1, 10, "nan", "range"), Err("range".to_string()));
        assert_eq!(validate_range("x", 1, 10, "nan", "range"), Err("nan".to_string()));
        assert!(validate_range("0.5", 0.0, 1.0, "nan", "range").is_ok());
    }

    #[test]
    fn validates_positive_numbers() {
        assert!(validate_positive("2", "bad").is_ok());
        assert!(validate_positive("0", "bad").is_err());
        assert!(validate_positive("-1", "bad").is_err());
        assert!(validate_positive("inf", "bad").is_err());
    }
}
