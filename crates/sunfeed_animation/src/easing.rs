//! Easing functions over normalized time

/// Maps normalized time `t ∈ [0, 1]` to eased progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic acceleration from zero velocity
    EaseIn,
    /// Quadratic deceleration to zero velocity
    EaseOut,
    /// Cubic acceleration until halfway, then deceleration
    EaseInOut,
}

impl Easing {
    /// Apply the easing curve. Input is clamped, so `apply(1.0)` is exactly `1.0`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = -2.0 * t + 2.0;
                    1.0 - f * f * f / 2.0
                }
            }
        }
    }
}
