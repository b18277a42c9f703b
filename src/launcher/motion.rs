// Small numeric helpers for the splat: wobble perturbation and mapping the
// world canvas' native pixel space onto the viewport.

use std::f64::consts::PI;

use super::timeline::WOBBLE_STEPS;

/// Scale / rotation for one wobble step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WobbleFrame {
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotate_deg: f64,
}

/// Decaying sinusoidal wobble: amplitude `1 - step/6`.
pub fn wobble_frame(step: u8) -> WobbleFrame {
    let s = step as f64;
    let amplitude = 1.0 - s / WOBBLE_STEPS as f64;
    WobbleFrame {
        scale_x: 1.0 + (s * PI).sin() * 0.05 * amplitude,
        scale_y: 0.85 + (s * PI).cos() * 0.03 * amplitude,
        rotate_deg: (s * 2.0 * PI).sin() * 2.0 * amplitude,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Displayed bounding box of the world canvas plus its native resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldMapping {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub native_width: f64,
    pub native_height: f64,
}

impl WorldMapping {
    /// Mapping that leaves coordinates untouched (used when the canvas is missing).
    pub fn identity() -> Self {
        Self { left: 0.0, top: 0.0, width: 1.0, height: 1.0, native_width: 1.0, native_height: 1.0 }
    }

    pub fn to_viewport(&self, p: Point) -> Point {
        let sx = if self.native_width > 0.0 { self.width / self.native_width } else { 0.0 };
        let sy = if self.native_height > 0.0 { self.height / self.native_height } else { 0.0 };
        Point::new(self.left + p.x * sx, self.top + p.y * sy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_wobble_step_zero() {
        let f = wobble_frame(0);
        assert!(close(f.scale_x, 1.0));
        assert!(close(f.scale_y, 0.88));
        assert!(close(f.rotate_deg, 0.0));
    }

    #[test]
    fn test_wobble_steps_match_formula() {
        // integer steps: sin terms vanish, cos alternates sign
        let expected_y = [0.88, 0.825, 0.87, 0.835, 0.86, 0.845];
        for step in 0..6u8 {
            let f = wobble_frame(step);
            assert!(close(f.scale_x, 1.0), "step {step} scale_x {}", f.scale_x);
            assert!(close(f.scale_y, expected_y[step as usize]), "step {step} scale_y {}", f.scale_y);
            assert!(close(f.rotate_deg, 0.0), "step {step} rotate {}", f.rotate_deg);
        }
    }

    #[test]
    fn test_world_mapping_scales_and_offsets() {
        let m = WorldMapping {
            left: 100.0,
            top: 50.0,
            width: 400.0,
            height: 300.0,
            native_width: 800.0,
            native_height: 600.0,
        };
        assert_eq!(m.to_viewport(Point::new(800.0, 600.0)), Point::new(500.0, 350.0));
        assert_eq!(m.to_viewport(Point::new(0.0, 0.0)), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_world_mapping_zero_native_size() {
        let m = WorldMapping { left: 5.0, top: 6.0, width: 10.0, height: 10.0, native_width: 0.0, native_height: 0.0 };
        assert_eq!(m.to_viewport(Point::new(123.0, 456.0)), Point::new(5.0, 6.0));
    }

    #[test]
    fn test_identity_mapping() {
        let p = Point::new(12.5, -3.0);
        assert_eq!(WorldMapping::identity().to_viewport(p), p);
    }
}
