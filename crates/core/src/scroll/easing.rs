use std::fmt;
use std::sync::Arc;

/// Shaping function applied to local progress before interpolation.
///
/// Built-ins deserialize from their camelCase names (`"easeOut"`); custom
/// curves are attached in code.
#[derive(Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    /// t²
    EaseIn,
    /// 1 - (1 - t)²
    EaseOut,
    EaseInOut,
    /// y-polynomial of a cubic bezier with control points (0.1, 0.1) and
    /// (0.92, 0.73), evaluated directly in t.
    CubicBezier,
    #[serde(skip)]
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

const BEZIER_P1Y: f64 = 0.1;
const BEZIER_P2Y: f64 = 0.73;

impl Easing {
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Easing::Custom(Arc::new(f))
    }

    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(2),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicBezier => {
                let cy = 3.0 * BEZIER_P1Y;
                let by = 3.0 * (BEZIER_P2Y - BEZIER_P1Y) - cy;
                let ay = 1.0 - cy - by;
                ay * t * t * t + by * t * t + cy * t
            }
            Easing::Custom(f) => f(t),
        }
    }

    /// Built-in curves, in declaration order.
    pub fn builtins() -> [Easing; 5] {
        [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::CubicBezier,
        ]
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("Linear"),
            Easing::EaseIn => f.write_str("EaseIn"),
            Easing::EaseOut => f.write_str("EaseOut"),
            Easing::EaseInOut => f.write_str("EaseInOut"),
            Easing::CubicBezier => f.write_str("CubicBezier"),
            Easing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn endpoints_are_stable() {
        for easing in Easing::builtins() {
            assert!(close(easing.apply(0.0), 0.0), "{:?} at 0", easing);
            assert!(close(easing.apply(1.0), 1.0), "{:?} at 1", easing);
        }
    }

    #[test]
    fn monotonic_spot_check() {
        for easing in Easing::builtins() {
            let a = easing.apply(0.25);
            let b = easing.apply(0.5);
            let c = easing.apply(0.75);
            assert!(a < b, "{:?}", easing);
            assert!(b < c, "{:?}", easing);
        }
    }

    #[test]
    fn known_midpoints() {
        assert_eq!(Easing::EaseIn.apply(0.5), 0.25);
        assert_eq!(Easing::EaseOut.apply(0.5), 0.75);
        assert_eq!(Easing::EaseInOut.apply(0.5), 0.5);
    }

    #[test]
    fn names_deserialize() {
        let easing: Easing = serde_json::from_str("\"easeInOut\"").unwrap();
        assert!(matches!(easing, Easing::EaseInOut));
        let easing: Easing = serde_json::from_str("\"cubicBezier\"").unwrap();
        assert!(matches!(easing, Easing::CubicBezier));
    }

    #[test]
    fn custom_curves_are_called() {
        let steps = Easing::custom(|t| (t * 4.0).floor() / 4.0);
        assert_eq!(steps.apply(0.6), 0.5);
    }
}
