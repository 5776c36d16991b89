//! Butterworth lowpass/highpass from cookbook biquads
//!
//! An order-N Butterworth filter factors into N/2 second-order stages that share
//! the cutoff and differ only in Q, plus one first-order stage when N is odd.
//! The second-order stages come straight from the `biquad` crate's RBJ formulas,
//! which pre-warp at the cutoff exactly like the bilinear design does, so the
//! magnitude response matches [`super::ZpkDesigner`].

use super::{CoefficientProvider, DesignRequest};
use crate::error::{FilterError, FilterResult};
use crate::params::{Cutoff, Design, FilterType};
use crate::section::SecondOrderSection;
use biquad::{Coefficients, Hertz, Type};
use std::f64::consts::PI;

/// Normalised design rate: a cutoff of 1.0 sits at Nyquist
const DESIGN_FS: f64 = 2.0;

/// Q of each Butterworth pole pair, lowest first
pub fn butterworth_q_values(order: usize) -> Vec<f64> {
    let n = order as f64;
    (0..order / 2)
        .rev()
        .map(|i| {
            let m = n - 1.0 - 2.0 * i as f64;
            1.0 / (2.0 * (PI * m / (2.0 * n)).cos())
        })
        .collect()
}

/// Coefficient provider backed by `biquad::Coefficients::from_params`.
///
/// Only Butterworth lowpass and highpass are supported; anything else is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookbookDesigner;

impl CookbookDesigner {
    fn first_order(filter_type: FilterType, wn: f64) -> SecondOrderSection {
        let k = (PI * wn / DESIGN_FS).tan();
        let a1 = (k - 1.0) / (k + 1.0);
        let b = match filter_type {
            FilterType::Highpass => [1.0 / (1.0 + k), -1.0 / (1.0 + k), 0.0],
            _ => [k / (1.0 + k), k / (1.0 + k), 0.0],
        };
        SecondOrderSection::new(b, [a1, 0.0])
    }
}

impl CoefficientProvider for CookbookDesigner {
    fn design(&self, request: &DesignRequest) -> FilterResult<Vec<SecondOrderSection>> {
        request.check()?;

        if request.design != Design::Butterworth {
            return Err(FilterError::ProviderRejected(format!(
                "cookbook designer only supports butter, got {}",
                request.design.family()
            )));
        }

        let (kind, wn) = match (request.filter_type, request.cutoff) {
            (FilterType::Lowpass, Cutoff::Single(wn)) => (Type::LowPass, wn),
            (FilterType::Highpass, Cutoff::Single(wn)) => (Type::HighPass, wn),
            (filter_type, _) => {
                return Err(FilterError::ProviderRejected(format!(
                    "cookbook designer only supports lowpass and highpass, got {}",
                    filter_type
                )))
            }
        };

        let rejected = |e: biquad::Errors| FilterError::ProviderRejected(format!("{:?}", e));
        let fs = Hertz::<f64>::from_hz(DESIGN_FS).map_err(rejected)?;
        let f0 = Hertz::<f64>::from_hz(wn).map_err(rejected)?;

        let mut sections = Vec::with_capacity((request.order + 1) / 2);
        if request.order % 2 == 1 {
            sections.push(Self::first_order(request.filter_type, wn));
        }
        for q in butterworth_q_values(request.order) {
            let coeffs = Coefficients::<f64>::from_params(kind, fs, f0, q).map_err(rejected)?;
            sections.push(coeffs.into());
        }

        Ok(sections)
    }

    fn name(&self) -> &str {
        "cookbook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ZpkDesigner;
    use num_complex::Complex64;

    fn magnitude(sections: &[SecondOrderSection], wn: f64) -> f64 {
        sections
            .iter()
            .map(|s| s.response(PI * wn))
            .fold(Complex64::new(1.0, 0.0), |acc, h| acc * h)
            .norm()
    }

    fn request(order: usize, wn: f64, filter_type: FilterType) -> DesignRequest {
        DesignRequest {
            order,
            cutoff: Cutoff::Single(wn),
            filter_type,
            design: Design::Butterworth,
        }
    }

    #[test]
    fn test_q_values() {
        let q2 = butterworth_q_values(2);
        assert_eq!(q2.len(), 1);
        assert!((q2[0] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);

        let q3 = butterworth_q_values(3);
        assert_eq!(q3.len(), 1);
        assert!((q3[0] - 1.0).abs() < 1e-12);

        let q4 = butterworth_q_values(4);
        assert!((q4[0] - 0.541_196_100_146_197).abs() < 1e-12);
        assert!((q4[1] - 1.306_562_964_876_376_5).abs() < 1e-12);
    }

    #[test]
    fn test_matches_zpk_designer() {
        for filter_type in [FilterType::Lowpass, FilterType::Highpass] {
            for order in 1..=7 {
                let r = request(order, 0.23, filter_type);
                let cookbook = CookbookDesigner.design(&r).unwrap();
                let zpk = ZpkDesigner.design(&r).unwrap();
                assert_eq!(cookbook.len(), zpk.len());

                for i in 1..40 {
                    let wn = i as f64 / 40.0;
                    let diff = (magnitude(&cookbook, wn) - magnitude(&zpk, wn)).abs();
                    assert!(diff < 1e-9, "{} order {} at {}: {}", filter_type, order, wn, diff);
                }
            }
        }
    }

    #[test]
    fn test_rejects_unsupported_requests() {
        let mut r = request(4, 0.2, FilterType::Lowpass);
        r.design = Design::Chebyshev1 { ripple_db: 1.0 };
        assert!(CookbookDesigner.design(&r).is_err());

        let r = DesignRequest {
            order: 2,
            cutoff: Cutoff::Band([0.1, 0.2]),
            filter_type: FilterType::Bandpass,
            design: Design::Butterworth,
        };
        assert!(CookbookDesigner.design(&r).is_err());
    }
}
