use crate::constants::grid::MAX_COORD;

/// Map grid `(x, y)` to normalized screen fractions `(u, v)`
///
/// The source grid is rotated 90 degrees clockwise (`xr = y`, `yr = 4095 - x`),
/// divided by 4095 and clamped to `[0, 1]` on each axis. `v` grows downward.
pub fn to_normalized(x: f64, y: f64) -> (f64, f64) {
    let xr = y;
    let yr = MAX_COORD - x;
    let u = (xr / MAX_COORD).clamp(0.0, 1.0);
    let v = (yr / MAX_COORD).clamp(0.0, 1.0);
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners() {
        assert_eq!(to_normalized(0.0, 0.0), (0.0, 1.0));
        assert_eq!(to_normalized(4095.0, 4095.0), (1.0, 0.0));
        assert_eq!(to_normalized(4095.0, 0.0), (0.0, 0.0));
        assert_eq!(to_normalized(0.0, 4095.0), (1.0, 1.0));
    }

    #[test]
    fn test_out_of_grid_is_clamped() {
        assert_eq!(to_normalized(-100.0, 5000.0), (1.0, 1.0));
        assert_eq!(to_normalized(9000.0, -1.0), (0.0, 0.0));
    }

    #[test]
    fn test_grid_stays_in_unit_square() {
        for x in (0..=4095).step_by(91) {
            for y in (0..=4095).step_by(117) {
                let (u, v) = to_normalized(f64::from(x), f64::from(y));
                assert!((0.0..=1.0).contains(&u), "u={u} for ({x},{y})");
                assert!((0.0..=1.0).contains(&v), "v={v} for ({x},{y})");
            }
        }
    }

    #[test]
    fn test_reproducible() {
        let a = to_normalized(1234.5, 2345.25);
        let b = to_normalized(1234.5, 2345.25);
        assert_eq!(a.0.to_bits(), b.0.to_bits());
        assert_eq!(a.1.to_bits(), b.1.to_bits());
    }
}
