use std::f32::consts::TAU;

/// Spring settings describing the frequency and damping of the contact penetration recovery spring.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpringSettings {
    /// Target number of undamped oscillations per unit of time, scaled by 2 * PI.
    pub angular_frequency: f32,
    /// Twice the ratio of the spring's actual damping to its critical damping.
    pub twice_damping_ratio: f32,
}

impl SpringSettings {
    /// Constructs a new spring settings instance.
    ///
    /// * `frequency`: Target number of undamped oscillations per unit of time.
    /// * `damping_ratio`: Ratio of the spring's actual damping to its critical damping.
    ///   0 is undamped, 1 is critically damped, and higher values are overdamped.
    pub fn new(frequency: f32, damping_ratio: f32) -> Self {
        let settings = Self {
            angular_frequency: frequency * TAU,
            twice_damping_ratio: damping_ratio * 2.0,
        };
        debug_assert!(
            settings.is_valid(),
            "Spring settings must have positive frequency and nonnegative damping ratio."
        );
        settings
    }

    /// Gets the target number of undamped oscillations per unit of time.
    #[inline(always)]
    pub fn frequency(&self) -> f32 {
        self.angular_frequency / TAU
    }

    /// Gets the ratio of the spring's actual damping to its critical damping.
    #[inline(always)]
    pub fn damping_ratio(&self) -> f32 {
        self.twice_damping_ratio / 2.0
    }

    /// Checks that the frequency is positive and the damping ratio nonnegative, both finite.
    pub fn is_valid(&self) -> bool {
        self.angular_frequency.is_finite()
            && self.angular_frequency > 0.0
            && self.twice_damping_ratio.is_finite()
            && self.twice_damping_ratio >= 0.0
    }
}
