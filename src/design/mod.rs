//! Coefficient providers
//!
//! A [`CoefficientProvider`] turns a [`DesignRequest`] (order, Nyquist-normalised
//! cutoffs, filter type, design family) into an ordered list of
//! [`SecondOrderSection`]s whose cascaded product realises the requested response.
//! The cascade engine only ever sees that list, so design backends can be swapped
//! freely.
//!
//! # Backends
//! - [`ZpkDesigner`] (default): analog prototype zeros/poles/gain, frequency
//!   transform, bilinear transform, nearest pole/zero pairing into sections.
//!   Supports every family and type.
//! - [`CookbookDesigner`]: Butterworth lowpass/highpass from per-pole-pair Q values
//!   using the `biquad` crate's cookbook formulas.
//!
//! Any closure `Fn(&DesignRequest) -> FilterResult<Vec<SecondOrderSection>>` is a
//! provider too, which is handy for tests and for hand-tuned coefficient tables.

mod cookbook;
mod sos;
mod zpk;

pub use cookbook::CookbookDesigner;
pub use sos::zpk_to_sos;
pub use zpk::{Zpk, ZpkDesigner};

use crate::error::{FilterError, FilterResult};
use crate::params::{Cutoff, Design, FilterSpec, FilterType};
use crate::section::SecondOrderSection;

/// Everything a provider needs to design one filter
///
/// Cutoffs are always Nyquist-normalised here (1.0 = Nyquist).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignRequest {
    pub order: usize,
    pub cutoff: Cutoff,
    pub filter_type: FilterType,
    pub design: Design,
}

impl DesignRequest {
    /// Build a request from a validated spec, normalising Hz cutoffs
    pub fn from_spec(spec: &FilterSpec) -> FilterResult<Self> {
        Ok(Self {
            order: spec.order,
            cutoff: spec.normalized_cutoff()?,
            filter_type: spec.filter_type,
            design: spec.design,
        })
    }

    /// Checks shared by every backend: order, cutoff count and range, band edge
    /// ordering, and the family parameter.
    pub fn check(&self) -> FilterResult<()> {
        if self.order == 0 {
            return Err(FilterError::ProviderRejected(
                "filter order must be at least 1".to_string(),
            ));
        }

        let cutoff = self.cutoff.as_slice();
        if cutoff.len() != self.filter_type.cutoff_count() {
            return Err(FilterError::ProviderRejected(format!(
                "{} filter needs {} cutoff frequencies, got {}",
                self.filter_type,
                self.filter_type.cutoff_count(),
                cutoff.len()
            )));
        }

        if let Some(bad) = cutoff.iter().find(|&&wn| !(wn > 0.0 && wn < 1.0)) {
            return Err(FilterError::ProviderRejected(format!(
                "digital filter critical frequencies must be 0 < Wn < 1, got {}",
                bad
            )));
        }

        if let Cutoff::Band([lo, hi]) = self.cutoff {
            if lo >= hi {
                return Err(FilterError::ProviderRejected(format!(
                    "lower band edge {} must be below upper band edge {}",
                    lo, hi
                )));
            }
        }

        match self.design {
            Design::Chebyshev1 { ripple_db } if !(ripple_db > 0.0 && ripple_db.is_finite()) => {
                Err(FilterError::ProviderRejected(format!(
                    "passband ripple must be positive, got {} dB",
                    ripple_db
                )))
            }
            Design::Chebyshev2 { attenuation_db }
                if !(attenuation_db > 0.0 && attenuation_db.is_finite()) =>
            {
                Err(FilterError::ProviderRejected(format!(
                    "stopband attenuation must be positive, got {} dB",
                    attenuation_db
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Source of second-order-section coefficients
pub trait CoefficientProvider {
    /// Design the sections for `request`, or explain why it cannot be done
    fn design(&self, request: &DesignRequest) -> FilterResult<Vec<SecondOrderSection>>;

    /// Short backend name for diagnostics
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> CoefficientProvider for F
where
    F: Fn(&DesignRequest) -> FilterResult<Vec<SecondOrderSection>>,
{
    fn design(&self, request: &DesignRequest) -> FilterResult<Vec<SecondOrderSection>> {
        self(request)
    }
}
