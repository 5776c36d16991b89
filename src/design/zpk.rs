//! Zero/pole/gain filter design
//!
//! Classical IIR design in four steps:
//! 1. Analog lowpass prototype with cutoff 1 rad/s (Butterworth, Chebyshev I/II)
//! 2. Frequency transform to the target type at pre-warped frequencies
//! 3. Bilinear transform to the z-plane
//! 4. Pairing of zeros and poles into second-order sections

use super::sos::zpk_to_sos;
use super::{CoefficientProvider, DesignRequest};
use crate::error::{FilterError, FilterResult};
use crate::params::{Cutoff, Design, FilterType};
use crate::section::SecondOrderSection;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Sampling frequency used for design; cutoffs are normalised so that 1.0 = fs/2.
const DESIGN_FS: f64 = 2.0;

/// Zeros, poles and gain of a filter:
///
/// ```text
/// H(s) = k * prod(s - z_i) / prod(s - p_i)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

fn product(values: &[Complex64]) -> Complex64 {
    values
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, &v| acc * v)
}

/// Symmetric indices -N+1, -N+3, ..., N-1 used to place prototype poles
fn pole_indices(order: usize) -> impl Iterator<Item = f64> {
    let n = order as f64;
    (0..order).map(move |i| -n + 1.0 + 2.0 * i as f64)
}

impl Zpk {
    /// Analog Butterworth prototype: N poles evenly spaced on the left half of the unit circle
    pub fn butterworth(order: usize) -> Self {
        let n = order as f64;
        let poles = pole_indices(order)
            .map(|m| -Complex64::from_polar(1.0, PI * m / (2.0 * n)))
            .collect();
        Self {
            zeros: Vec::new(),
            poles,
            gain: 1.0,
        }
    }

    /// Analog Chebyshev type I prototype with `ripple_db` of passband ripple.
    ///
    /// Even orders start the passband at the bottom of the ripple, so their DC
    /// gain is `-ripple_db`.
    pub fn chebyshev1(order: usize, ripple_db: f64) -> Self {
        let n = order as f64;
        let eps = (10f64.powf(0.1 * ripple_db) - 1.0).sqrt();
        let mu = (1.0 / eps).asinh() / n;

        let poles: Vec<Complex64> = pole_indices(order)
            .map(|m| {
                let theta = PI * m / (2.0 * n);
                // -sinh(mu + j*theta)
                Complex64::new(-mu.sinh() * theta.cos(), -mu.cosh() * theta.sin())
            })
            .collect();

        let mut gain = product(&poles.iter().map(|p| -p).collect::<Vec<_>>()).re;
        if order % 2 == 0 {
            gain /= (1.0 + eps * eps).sqrt();
        }

        Self {
            zeros: Vec::new(),
            poles,
            gain,
        }
    }

    /// Analog Chebyshev type II prototype with `attenuation_db` of stopband attenuation.
    ///
    /// The stopband edge sits at 1 rad/s.
    pub fn chebyshev2(order: usize, attenuation_db: f64) -> Self {
        let n = order as f64;
        let de = 1.0 / (10f64.powf(0.1 * attenuation_db) - 1.0).sqrt();
        let mu = (1.0 / de).asinh() / n;

        // Zeros on the imaginary axis; odd orders skip m = 0 (zero at infinity)
        let zeros: Vec<Complex64> = pole_indices(order)
            .filter(|&m| m != 0.0)
            .map(|m| Complex64::new(0.0, 1.0 / (m * PI / (2.0 * n)).sin()))
            .collect();

        let poles: Vec<Complex64> = pole_indices(order)
            .map(|m| {
                let p = -Complex64::from_polar(1.0, PI * m / (2.0 * n));
                let warped = Complex64::new(mu.sinh() * p.re, mu.cosh() * p.im);
                warped.inv()
            })
            .collect();

        let neg_poles: Vec<Complex64> = poles.iter().map(|p| -p).collect();
        let neg_zeros: Vec<Complex64> = zeros.iter().map(|z| -z).collect();
        let gain = (product(&neg_poles) / product(&neg_zeros)).re;

        Self {
            zeros,
            poles,
            gain,
        }
    }

    /// Excess of poles over zeros
    fn relative_degree(&self) -> FilterResult<usize> {
        self.poles.len().checked_sub(self.zeros.len()).ok_or_else(|| {
            FilterError::ProviderRejected("improper transfer function: more zeros than poles".to_string())
        })
    }

    /// Lowpass prototype to lowpass with cutoff `wo` (rad/s)
    pub fn lowpass_to_lowpass(self, wo: f64) -> FilterResult<Self> {
        let degree = self.relative_degree()?;
        Ok(Self {
            zeros: self.zeros.iter().map(|z| z * wo).collect(),
            poles: self.poles.iter().map(|p| p * wo).collect(),
            gain: self.gain * wo.powi(degree as i32),
        })
    }

    /// Lowpass prototype to highpass with cutoff `wo` (rad/s)
    pub fn lowpass_to_highpass(self, wo: f64) -> FilterResult<Self> {
        let degree = self.relative_degree()?;
        let neg_zeros: Vec<Complex64> = self.zeros.iter().map(|z| -z).collect();
        let neg_poles: Vec<Complex64> = self.poles.iter().map(|p| -p).collect();

        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|z| wo / z).collect();
        zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

        Ok(Self {
            zeros,
            poles: self.poles.iter().map(|p| wo / p).collect(),
            gain: self.gain * (product(&neg_zeros) / product(&neg_poles)).re,
        })
    }

    /// Lowpass prototype to bandpass centred on `wo` with bandwidth `bw` (rad/s)
    pub fn lowpass_to_bandpass(self, wo: f64, bw: f64) -> FilterResult<Self> {
        let degree = self.relative_degree()?;

        let mut zeros = split_band(&self.zeros, |z| z * (bw / 2.0), wo);
        zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(degree));

        Ok(Self {
            zeros,
            poles: split_band(&self.poles, |p| p * (bw / 2.0), wo),
            gain: self.gain * bw.powi(degree as i32),
        })
    }

    /// Lowpass prototype to bandstop centred on `wo` with bandwidth `bw` (rad/s)
    pub fn lowpass_to_bandstop(self, wo: f64, bw: f64) -> FilterResult<Self> {
        let degree = self.relative_degree()?;
        let neg_zeros: Vec<Complex64> = self.zeros.iter().map(|z| -z).collect();
        let neg_poles: Vec<Complex64> = self.poles.iter().map(|p| -p).collect();

        let mut zeros = split_band(&self.zeros, |z| (bw / 2.0) / z, wo);
        // Zeros at +-j*wo for every zero the prototype had at infinity
        zeros.extend(std::iter::repeat(Complex64::new(0.0, wo)).take(degree));
        zeros.extend(std::iter::repeat(Complex64::new(0.0, -wo)).take(degree));

        Ok(Self {
            zeros,
            poles: split_band(&self.poles, |p| (bw / 2.0) / p, wo),
            gain: self.gain * (product(&neg_zeros) / product(&neg_poles)).re,
        })
    }

    /// Bilinear transform from the s-plane to the z-plane at sampling rate `fs`.
    ///
    /// ```text
    /// z = (2*fs + s) / (2*fs - s)
    /// ```
    /// Zeros at infinity land on z = -1.
    pub fn bilinear(self, fs: f64) -> FilterResult<Self> {
        let degree = self.relative_degree()?;
        let fs2 = 2.0 * fs;

        let mut zeros: Vec<Complex64> = self.zeros.iter().map(|z| (fs2 + z) / (fs2 - z)).collect();
        zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

        let zero_terms: Vec<Complex64> = self.zeros.iter().map(|z| fs2 - z).collect();
        let pole_terms: Vec<Complex64> = self.poles.iter().map(|p| fs2 - p).collect();

        Ok(Self {
            zeros,
            poles: self.poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect(),
            gain: self.gain * (product(&zero_terms) / product(&pole_terms)).re,
        })
    }
}

/// Each root r (after `scale`) becomes the pair r +- sqrt(r^2 - wo^2); all the
/// "+" roots come first, then all the "-" roots.
fn split_band(
    roots: &[Complex64],
    scale: impl Fn(&Complex64) -> Complex64,
    wo: f64,
) -> Vec<Complex64> {
    let scaled: Vec<Complex64> = roots.iter().map(scale).collect();
    let offsets: Vec<Complex64> = scaled.iter().map(|r| (r * r - wo * wo).sqrt()).collect();

    scaled
        .iter()
        .zip(&offsets)
        .map(|(r, d)| r + d)
        .chain(scaled.iter().zip(&offsets).map(|(r, d)| r - d))
        .collect()
}

/// Pre-warp a normalised digital frequency for the bilinear transform
fn prewarp(wn: f64) -> f64 {
    2.0 * DESIGN_FS * (PI * wn / DESIGN_FS).tan()
}

/// Default coefficient provider: analog prototype, frequency transform, bilinear
/// transform, then nearest-neighbour pairing into second-order sections.
///
/// Section layout follows the usual convention: the overall gain sits in the
/// first section and the poles closest to the unit circle come last.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZpkDesigner;

impl ZpkDesigner {
    /// Digital zeros/poles/gain for `request`
    pub fn digital_zpk(&self, request: &DesignRequest) -> FilterResult<Zpk> {
        request.check()?;

        let prototype = match request.design {
            Design::Butterworth => Zpk::butterworth(request.order),
            Design::Chebyshev1 { ripple_db } => Zpk::chebyshev1(request.order, ripple_db),
            Design::Chebyshev2 { attenuation_db } => {
                Zpk::chebyshev2(request.order, attenuation_db)
            }
        };

        let analog = match (request.filter_type, request.cutoff) {
            (FilterType::Lowpass, Cutoff::Single(wn)) => prototype.lowpass_to_lowpass(prewarp(wn))?,
            (FilterType::Highpass, Cutoff::Single(wn)) => {
                prototype.lowpass_to_highpass(prewarp(wn))?
            }
            (FilterType::Bandpass, Cutoff::Band([lo, hi])) => {
                let (wl, wh) = (prewarp(lo), prewarp(hi));
                prototype.lowpass_to_bandpass((wl * wh).sqrt(), wh - wl)?
            }
            (FilterType::Bandstop, Cutoff::Band([lo, hi])) => {
                let (wl, wh) = (prewarp(lo), prewarp(hi));
                prototype.lowpass_to_bandstop((wl * wh).sqrt(), wh - wl)?
            }
            (filter_type, cutoff) => {
                return Err(FilterError::ProviderRejected(format!(
                    "{} filter cannot use cutoff {:?}",
                    filter_type, cutoff
                )))
            }
        };

        analog.bilinear(DESIGN_FS)
    }
}

impl CoefficientProvider for ZpkDesigner {
    fn design(&self, request: &DesignRequest) -> FilterResult<Vec<SecondOrderSection>> {
        let digital = self.digital_zpk(request)?;
        zpk_to_sos(&digital)
    }

    fn name(&self) -> &str {
        "zpk"
    }
}
