//! The four boundary sets a design is checked against.

use tracing::warn;

use crate::bounds::defaults;
use crate::bounds::set::{merged_abscissas, BoundKind, BoundSet};
use crate::error::FilterError;

/// Magnitude (dB) and group-delay masks, each with an upper and lower side.
#[derive(Debug, Clone, PartialEq)]
pub struct Masks {
    pub magnitude_upper: BoundSet,
    pub magnitude_lower: BoundSet,
    pub delay_upper: BoundSet,
    pub delay_lower: BoundSet,
}

impl Masks {
    pub fn new(
        magnitude_upper: BoundSet,
        magnitude_lower: BoundSet,
        delay_upper: BoundSet,
        delay_lower: BoundSet,
    ) -> Result<Self, FilterError> {
        let sides = [
            ("magnitude upper", &magnitude_upper, BoundKind::Upper),
            ("magnitude lower", &magnitude_lower, BoundKind::Lower),
            ("delay upper", &delay_upper, BoundKind::Upper),
            ("delay lower", &delay_lower, BoundKind::Lower),
        ];
        for (name, set, expected) in sides {
            if set.kind() != expected {
                return Err(FilterError::Config(format!(
                    "{name} mask built as {:?} bound",
                    set.kind()
                )));
            }
        }
        Ok(Self {
            magnitude_upper,
            magnitude_lower,
            delay_upper,
            delay_lower,
        })
    }

    /// No constraint on either response.
    pub fn unconstrained() -> Self {
        Self {
            magnitude_upper: BoundSet::empty(BoundKind::Upper),
            magnitude_lower: BoundSet::empty(BoundKind::Lower),
            delay_upper: BoundSet::empty(BoundKind::Upper),
            delay_lower: BoundSet::empty(BoundKind::Lower),
        }
    }

    /// The built-in masks (see `bounds::defaults`).
    pub fn builtin(scale: bool) -> Result<Self, FilterError> {
        Ok(Self {
            magnitude_upper: defaults::upper_magnitude(scale)?,
            magnitude_lower: defaults::lower_magnitude(scale)?,
            delay_upper: defaults::upper_delay(scale)?,
            delay_lower: defaults::lower_delay(scale)?,
        })
    }

    pub fn is_unconstrained(&self) -> bool {
        !(self.magnitude_upper.is_active()
            || self.magnitude_lower.is_active()
            || self.delay_upper.is_active()
            || self.delay_lower.is_active())
    }

    /// Replace an entirely empty configuration with the built-in masks.
    pub fn or_builtin(self, scale: bool) -> Result<Self, FilterError> {
        if self.is_unconstrained() {
            warn!("no bounds configured, using the built-in masks");
            return Self::builtin(scale);
        }
        Ok(self)
    }

    /// Abscissas where the magnitude response has to be sampled.
    pub fn magnitude_grid(&self) -> Vec<f64> {
        merged_abscissas(&[&self.magnitude_lower, &self.magnitude_upper])
    }

    /// Abscissas where the group delay has to be sampled.
    pub fn delay_grid(&self) -> Vec<f64> {
        merged_abscissas(&[&self.delay_upper, &self.delay_lower])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_masks_fall_back_to_builtin() {
        let masks = Masks::unconstrained();
        assert!(masks.is_unconstrained());
        let masks = masks.or_builtin(true).unwrap();
        assert!(!masks.is_unconstrained());
        assert!(!masks.magnitude_grid().is_empty());
        assert!(!masks.delay_grid().is_empty());
    }

    #[test]
    fn partial_masks_are_kept() {
        let upper = BoundSet::parse("0,0.5,0,0,5", BoundKind::Upper, true).unwrap();
        let masks = Masks::new(
            upper.clone(),
            BoundSet::empty(BoundKind::Lower),
            BoundSet::empty(BoundKind::Upper),
            BoundSet::empty(BoundKind::Lower),
        )
        .unwrap()
        .or_builtin(true)
        .unwrap();
        assert_eq!(masks.magnitude_upper, upper);
        assert!(masks.delay_grid().is_empty());
    }

    #[test]
    fn wrong_side_is_rejected() {
        let err = Masks::new(
            BoundSet::empty(BoundKind::Lower),
            BoundSet::empty(BoundKind::Lower),
            BoundSet::empty(BoundKind::Upper),
            BoundSet::empty(BoundKind::Lower),
        );
        assert!(matches!(err, Err(FilterError::Config(_))));
    }
}
