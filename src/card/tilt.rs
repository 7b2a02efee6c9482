/// Full swing of the tilt across the card; the angle at either edge is half of this
pub const TILT_RANGE_DEG: f32 = 20.0;

const SHEEN_DIVISOR: f32 = 30.0;
pub const SHEEN_MAX_OPACITY: f32 = 0.6;

/// Pointer-driven rotation of a card, in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tilt {
    pub rotate_x: f32,
    pub rotate_y: f32,
}

impl Tilt {
    pub const REST: Tilt = Tilt { rotate_x: 0.0, rotate_y: 0.0 };

    /// Angles for a pointer at (`x`, `y`) relative to the card's top-left corner.
    ///
    /// `rotate_y = (x/width - 0.5) * range` and `rotate_x = -(y/height - 0.5) * range`.
    /// The pointer is clamped to the card, so neither angle exceeds `range / 2`.
    pub fn from_pointer(x: f32, y: f32, width: f32, height: f32, range: f32) -> Self {
        if !(width > 0.0 && height > 0.0) || !x.is_finite() || !y.is_finite() {
            return Tilt::REST;
        }
        let nx = (x / width).clamp(0.0, 1.0);
        let ny = (y / height).clamp(0.0, 1.0);
        Tilt {
            rotate_x: -(ny - 0.5) * range,
            rotate_y: (nx - 0.5) * range,
        }
    }

    /// Opacity of the light-reflection overlay; grows with both angles, capped at 0.6
    pub fn sheen_opacity(&self) -> f32 {
        let raw = self.rotate_x.abs() / SHEEN_DIVISOR + self.rotate_y.abs() / SHEEN_DIVISOR;
        raw.min(SHEEN_MAX_OPACITY)
    }

    pub fn is_rest(&self) -> bool {
        self.rotate_x == 0.0 && self.rotate_y == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_rest_and_corners_hit_the_limit() {
        let center = Tilt::from_pointer(200.0, 80.0, 400.0, 160.0, TILT_RANGE_DEG);
        assert!(center.is_rest());
        assert_eq!(center.sheen_opacity(), 0.0);

        let top_left = Tilt::from_pointer(0.0, 0.0, 400.0, 160.0, TILT_RANGE_DEG);
        assert_eq!(top_left, Tilt { rotate_x: 10.0, rotate_y: -10.0 });

        let bottom_right = Tilt::from_pointer(400.0, 160.0, 400.0, 160.0, TILT_RANGE_DEG);
        assert_eq!(bottom_right, Tilt { rotate_x: -10.0, rotate_y: 10.0 });
    }

    #[test]
    fn test_angles_stay_bounded_for_any_pointer() {
        let limit = TILT_RANGE_DEG / 2.0;
        let mut x = -500.0;
        while x <= 1000.0 {
            let mut y = -300.0;
            while y <= 600.0 {
                let t = Tilt::from_pointer(x, y, 384.0, 160.0, TILT_RANGE_DEG);
                assert!(t.rotate_x.abs() <= limit && t.rotate_y.abs() <= limit, "{:?} at ({}, {})", t, x, y);
                y += 17.0;
            }
            x += 23.0;
        }
    }

    #[test]
    fn test_sheen_is_monotone_and_capped() {
        let weak = Tilt { rotate_x: 3.0, rotate_y: 0.0 }.sheen_opacity();
        let stronger = Tilt { rotate_x: 3.0, rotate_y: 4.0 }.sheen_opacity();
        assert!((weak - 0.1).abs() < 1e-6);
        assert!(stronger > weak);
        assert_eq!(Tilt { rotate_x: -10.0, rotate_y: 10.0 }.sheen_opacity(), SHEEN_MAX_OPACITY);
    }

    #[test]
    fn test_degenerate_bounds_give_rest() {
        assert!(Tilt::from_pointer(5.0, 5.0, 0.0, 100.0, TILT_RANGE_DEG).is_rest());
        assert!(Tilt::from_pointer(f32::NAN, 5.0, 10.0, 10.0, TILT_RANGE_DEG).is_rest());
    }
}
