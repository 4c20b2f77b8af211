//! Occupancy arithmetic.
//!
//! Pure and total: defined for every input, including a detected count above
//! the declared capacity (free spaces clamp to zero, occupancy exceeds 100).

/// Occupancy figures for one analysis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupancyMetrics {
    pub free_spaces: u32,
    /// Percentage of capacity in use, rounded to two decimal places.
    pub occupancy_pct: f64,
}

/// Compute occupancy figures from a declared capacity and a vehicle count.
///
/// A zero capacity yields zero free spaces and 0.0 percent occupancy.
pub fn compute(total_spaces: u32, detected_cars: u32) -> OccupancyMetrics {
    let free_spaces = total_spaces.saturating_sub(detected_cars);
    let occupancy_pct = if total_spaces > 0 {
        round2(100.0 * f64::from(detected_cars) / f64::from(total_spaces))
    } else {
        0.0
    };
    OccupancyMetrics {
        free_spaces,
        occupancy_pct,
    }
}

/// Round to two decimal places. Stored and displayed values must agree, so
/// rounding happens once, here, before the record is built.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typical_lot() {
        let m = compute(50, 12);
        assert_eq!(m.free_spaces, 38);
        assert_eq!(m.occupancy_pct, 24.0);
    }

    #[test]
    fn overcount_clamps_free_spaces() {
        let m = compute(10, 15);
        assert_eq!(m.free_spaces, 0);
        assert_eq!(m.occupancy_pct, 150.0);
    }

    #[test]
    fn zero_capacity() {
        let m = compute(0, 7);
        assert_eq!(m.free_spaces, 0);
        assert_eq!(m.occupancy_pct, 0.0);
    }

    #[test]
    fn empty_lot() {
        let m = compute(25, 0);
        assert_eq!(m.free_spaces, 25);
        assert_eq!(m.occupancy_pct, 0.0);
    }

    #[test]
    fn rounds_to_two_decimals() {
        let m = compute(3, 1);
        assert_eq!(m.occupancy_pct, 33.33);
        let m = compute(3, 2);
        assert_eq!(m.occupancy_pct, 66.67);
    }
}
