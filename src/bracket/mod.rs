//! Nearest-value bracketing over sparse table columns
//!
//! Handbook tables list standard sizes only. A requested depth or diameter either
//! matches one of them exactly or falls between two neighbours, which bracket it.
//!
//! When nothing qualifies on one side, the fallback is positional: the first element
//! for the lower bound and the last element for the upper bound, in caller order.
//! The order of `values` is therefore significant.

use crate::error::InvalidArgument;

/// Largest value `<= target`, or `values[0]` when no value qualifies
pub fn nearest_below_or_equal(values: &[f64], target: f64) -> Result<f64, InvalidArgument> {
    if values.is_empty() {
        return Err(InvalidArgument::EmptyBracket);
    }

    let mut idx = 0;
    let mut best = f64::NEG_INFINITY;
    for (i, &x) in values.iter().enumerate() {
        if x == target {
            return Ok(target);
        }
        if target - x > 0.0 && x > best {
            best = x;
            idx = i;
        }
    }
    Ok(values[idx])
}

/// Smallest value `>= target`, or the last element when no value qualifies.
///
/// The running minimum starts at infinity, not at the largest value. Starting at
/// the maximum would skip the maximum itself, so a column whose only value above
/// `target` is its maximum (and not its last element) would fall back to a value
/// below `target`.
pub fn nearest_above_or_equal(values: &[f64], target: f64) -> Result<f64, InvalidArgument> {
    if values.is_empty() {
        return Err(InvalidArgument::EmptyBracket);
    }

    let mut idx = values.len() - 1;
    let mut best = f64::INFINITY;
    for (i, &x) in values.iter().enumerate() {
        if x == target {
            return Ok(target);
        }
        if target - x < 0.0 && x < best {
            best = x;
            idx = i;
        }
    }
    Ok(values[idx])
}

/// Pair of table values surrounding a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub low: f64,
    pub high: f64,
}

impl Bracket {
    pub fn around(values: &[f64], target: f64) -> Result<Self, InvalidArgument> {
        Ok(Self {
            low: nearest_below_or_equal(values, target)?,
            high: nearest_above_or_equal(values, target)?,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value == self.low || value == self.high
    }

    pub fn is_exact(&self) -> bool {
        self.low == self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAMETERS: [f64; 5] = [0.5, 0.125, 1.0, 0.25, 0.375];

    #[test]
    fn test_exact_match_returns_target() {
        for &d in &DIAMETERS {
            assert_eq!(nearest_below_or_equal(&DIAMETERS, d), Ok(d));
            assert_eq!(nearest_above_or_equal(&DIAMETERS, d), Ok(d));
        }
    }

    #[test]
    fn test_bracket_encloses_target_in_range() {
        let targets = [0.126, 0.157, 0.2, 0.3, 0.4, 0.5, 0.74, 0.99];
        for &t in &targets {
            let b = Bracket::around(&DIAMETERS, t).unwrap();
            assert!(b.low <= t, "low {} > target {}", b.low, t);
            assert!(t <= b.high, "high {} < target {}", b.high, t);
        }

        let b = Bracket::around(&DIAMETERS, 0.157).unwrap();
        assert_eq!(b, Bracket { low: 0.125, high: 0.25 });
        assert!(!b.is_exact());
    }

    #[test]
    fn test_below_falls_back_to_first_element() {
        // Nothing <= 0.1, so the first element is returned, not the minimum
        assert_eq!(nearest_below_or_equal(&DIAMETERS, 0.1), Ok(0.5));
        assert_eq!(nearest_below_or_equal(&DIAMETERS, -2.0), Ok(0.5));
    }

    #[test]
    fn test_maximum_alone_above_target() {
        let values = [1.0, 0.25];
        assert_eq!(nearest_above_or_equal(&values, 0.5), Ok(1.0));
        assert_eq!(Bracket::around(&values, 0.5), Ok(Bracket { low: 0.25, high: 1.0 }));
    }

    #[test]
    fn test_above_falls_back_to_last_element() {
        // Nothing >= 2.0, so the last element is returned, not the maximum
        assert_eq!(nearest_above_or_equal(&DIAMETERS, 2.0), Ok(0.375));
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(
            nearest_below_or_equal(&[], 1.0),
            Err(InvalidArgument::EmptyBracket)
        );
        assert_eq!(
            nearest_above_or_equal(&[], 1.0),
            Err(InvalidArgument::EmptyBracket)
        );
    }

    #[test]
    fn test_single_value() {
        let b = Bracket::around(&[0.25], 0.3).unwrap();
        assert!(b.is_exact());
        assert!(b.contains(0.25));
    }
}
