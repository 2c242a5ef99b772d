use std::error::Error;
use std::f64::consts::{PI, TAU};
use std::fmt;

/// InputValueError is used if some simulation option does not fulfill the posed requirements,
/// e.g., a timestep size outside of the supported range.
#[derive(Debug, Clone)]
pub struct InputValueError;

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value")
    }
}

impl Error for InputValueError {}

/// wrap_angle maps an angle (rad) into the range [0, 2 * pi).
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);

    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// angle_diff returns the signed shortest rotation (rad) from angle `from` to angle `to` in the
/// range ]-pi, pi].
pub fn angle_diff(to: f64, from: f64) -> f64 {
    let mut diff = (to - from).rem_euclid(TAU);

    if diff > PI {
        diff -= TAU
    }

    diff
}

/// min returns the minimum value in the array x.
pub fn min<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> T {
    let &min_val = x.iter().fold(
        &x[0],
        |val_min, val| {
            if val_min < val {
                val_min
            } else {
                val
            }
        },
    );
    min_val
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wrap_angle_stays_in_range() {
        assert_relative_eq!(wrap_angle(-0.5 * PI), 1.5 * PI);
        assert_relative_eq!(wrap_angle(2.5 * PI), 0.5 * PI);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert!(wrap_angle(-1e-18) < TAU);
    }

    #[test]
    fn angle_diff_takes_short_way() {
        assert_relative_eq!(angle_diff(0.1, TAU - 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_diff(TAU - 0.1, 0.1), -0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_diff(-0.5 * PI, 0.0), -0.5 * PI, epsilon = 1e-12);
    }

    #[test]
    fn min_of_slice() {
        assert_eq!(min(&[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(min(&[7]), 7);
    }
}
