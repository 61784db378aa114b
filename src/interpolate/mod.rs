//! Feed and speed resolution from bracketing rows

use crate::error::Unresolved;
use crate::reference::ReferenceRow;
use tracing::debug;

/// Chip load and surface speed for a setup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSpeed {
    pub feed: f64,  // inches per tooth
    pub speed: f64, // surface feet per minute
}

/// Resolve feed and speed at `tool_diameter` from the filtered rows.
///
/// Two rows are interpolated against cutter diameter, clamping outside the pair.
/// A pair sharing one diameter is interpolated against depth of cut instead, and a
/// pair that differs in neither is ambiguous. One row is used as is. Anything else
/// is unresolved.
pub fn resolve(
    rows: &[&ReferenceRow],
    tool_diameter: f64,
    depth_of_cut: f64,
) -> Result<FeedSpeed, Unresolved> {
    match rows {
        [] => Err(Unresolved::NoMatch),
        [row] => Ok(FeedSpeed {
            feed: row.feed,
            speed: row.speed,
        }),
        [a, b] => {
            let result = interpolate_pair(a, b, tool_diameter, depth_of_cut)?;
            debug!(tool_diameter, depth_of_cut, feed = result.feed, speed = result.speed, "interpolated");
            Ok(result)
        }
        _ => Err(Unresolved::Ambiguous { rows: rows.len() }),
    }
}

fn interpolate_pair(
    a: &ReferenceRow,
    b: &ReferenceRow,
    diameter: f64,
    depth: f64,
) -> Result<FeedSpeed, Unresolved> {
    interpolate_along(a, b, |row| row.cutter_diameter, diameter)
        .or_else(|| interpolate_along(a, b, |row| row.depth_of_cut, depth))
        .ok_or(Unresolved::Ambiguous { rows: 2 })
}

/// Interpolate the pair along one numeric column, `None` unless both rows
/// carry distinct values there
fn interpolate_along(
    a: &ReferenceRow,
    b: &ReferenceRow,
    key: impl Fn(&ReferenceRow) -> Option<f64>,
    x: f64,
) -> Option<FeedSpeed> {
    let (ka, kb) = (key(a)?, key(b)?);
    if ka == kb {
        return None;
    }
    let ((x0, lo), (x1, hi)) = if ka < kb { ((ka, a), (kb, b)) } else { ((kb, b), (ka, a)) };

    Some(FeedSpeed {
        feed: round4(lerp_clamped(x0, lo.feed, x1, hi.feed, x)),
        speed: round4(lerp_clamped(x0, lo.speed, x1, hi.speed, x)),
    })
}

fn lerp_clamped(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if x <= x0 {
        y0
    } else if x >= x1 {
        y1
    } else {
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

pub(crate) fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(diameter: f64, feed: f64, speed: f64) -> ReferenceRow {
        at_depth(0.25, diameter, feed, speed)
    }

    fn at_depth(depth: f64, diameter: f64, feed: f64, speed: f64) -> ReferenceRow {
        ReferenceRow {
            family: "Plywood".to_string(),
            species: None,
            tool_material: "HSS".to_string(),
            operation: "End Milling".to_string(),
            depth_of_cut: Some(depth),
            cutter_diameter: Some(diameter),
            feed,
            speed,
        }
    }

    #[test]
    fn test_exact_at_endpoints_and_midpoint() {
        let a = row(2.0, 1.0, 100.0);
        let b = row(4.0, 3.0, 300.0);
        let rows = [&a, &b];

        assert_eq!(resolve(&rows, 2.0, 0.25), Ok(FeedSpeed { feed: 1.0, speed: 100.0 }));
        assert_eq!(resolve(&rows, 4.0, 0.25), Ok(FeedSpeed { feed: 3.0, speed: 300.0 }));
        assert_eq!(resolve(&rows, 3.0, 0.25), Ok(FeedSpeed { feed: 2.0, speed: 200.0 }));
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let a = row(2.0, 1.0, 100.0);
        let b = row(4.0, 3.0, 300.0);
        assert_eq!(resolve(&[&b, &a], 2.5, 0.25), resolve(&[&a, &b], 2.5, 0.25));
    }

    #[test]
    fn test_clamps_outside_bracket() {
        let a = row(2.0, 1.0, 100.0);
        let b = row(4.0, 3.0, 300.0);
        let rows = [&a, &b];
        assert_eq!(resolve(&rows, 1.0, 0.25), Ok(FeedSpeed { feed: 1.0, speed: 100.0 }));
        assert_eq!(resolve(&rows, 9.0, 0.25), Ok(FeedSpeed { feed: 3.0, speed: 300.0 }));
    }

    #[test]
    fn test_rounds_to_four_digits() {
        let a = row(0.125, 0.003, 500.0);
        let b = row(0.25, 0.005, 600.0);
        let fs = resolve(&[&a, &b], 0.157, 0.25).unwrap();
        assert_eq!(fs.feed, 0.0035);
        assert_eq!(fs.speed, 525.6);
    }

    #[test]
    fn test_single_row_used_directly() {
        let a = row(0.25, 0.00512345, 612.34567);
        assert_eq!(
            resolve(&[&a], 3.0, 0.25),
            Ok(FeedSpeed { feed: 0.00512345, speed: 612.34567 })
        );
    }

    #[test]
    fn test_same_diameter_interpolates_depth() {
        let shallow = at_depth(0.125, 0.25, 0.006, 650.0);
        let deep = at_depth(0.5, 0.25, 0.004, 500.0);
        let rows = [&deep, &shallow];

        assert_eq!(resolve(&rows, 0.25, 0.125), Ok(FeedSpeed { feed: 0.006, speed: 650.0 }));
        assert_eq!(resolve(&rows, 0.25, 0.5), Ok(FeedSpeed { feed: 0.004, speed: 500.0 }));
        // 0.25 sits a third of the way from 0.125 to 0.5
        assert_eq!(
            resolve(&rows, 0.25, 0.25),
            Ok(FeedSpeed { feed: 0.0053, speed: 600.0 })
        );
        assert_eq!(resolve(&rows, 0.25, 1.0), Ok(FeedSpeed { feed: 0.004, speed: 500.0 }));
    }

    #[test]
    fn test_duplicate_setup_is_ambiguous() {
        // Same depth and diameter, e.g. two operations left in by an unset filter
        let mut end_milling = row(0.25, 0.005, 600.0);
        end_milling.operation = "End Milling".to_string();
        let mut slotting = row(0.25, 0.002, 300.0);
        slotting.operation = "Slotting".to_string();

        assert_eq!(
            resolve(&[&end_milling, &slotting], 0.25, 0.25),
            Err(Unresolved::Ambiguous { rows: 2 })
        );
    }

    #[test]
    fn test_blank_depth_without_distinct_diameter_is_ambiguous() {
        let mut a = row(0.25, 0.005, 600.0);
        a.depth_of_cut = None;
        let b = row(0.25, 0.004, 500.0);
        assert_eq!(resolve(&[&a, &b], 0.25, 0.25), Err(Unresolved::Ambiguous { rows: 2 }));
    }

    #[test]
    fn test_unresolved() {
        assert_eq!(resolve(&[], 0.25, 0.25), Err(Unresolved::NoMatch));

        let a = row(0.25, 0.005, 600.0);
        assert_eq!(
            resolve(&[&a, &a, &a], 0.25, 0.25),
            Err(Unresolved::Ambiguous { rows: 3 })
        );
    }
}
