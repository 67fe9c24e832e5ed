use std::{fmt::Display, ops::Deref};

/// Percentage value, always printed with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Converts a ratio in `0.0..=1.0` into a percentage. Invalid ratios are clamped to 0.
    pub fn from_ratio(ratio: f64) -> Percentage {
        Percentage::new_opt(ratio * 100.).unwrap_or(Percentage(0.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
