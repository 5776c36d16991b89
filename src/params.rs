//! Filter parameters
//!
//! Two layers describe a filter:
//! - [`FilterParams`]: the loose, string-typed construction interface
//!   (`order, cutoff, filter_type, design="butter", ripple_db=1, attenuation_db=1,
//!   sample_rate_hz=0`). This is what configs deserialize into.
//! - [`FilterSpec`]: the validated, strongly typed form handed to the designers.
//!
//! [`FilterParams::validate`] is the only place the three construction checks
//! (design family, filter type, negative sample rate) happen.

use crate::error::{FilterError, FilterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filter response types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Passes frequencies below the cutoff
    Lowpass,
    /// Passes frequencies above the cutoff
    Highpass,
    /// Passes frequencies between two cutoffs
    Bandpass,
    /// Rejects frequencies between two cutoffs (notch)
    Bandstop,
}

impl FilterType {
    /// Number of cutoff frequencies this type needs
    pub fn cutoff_count(&self) -> usize {
        match self {
            FilterType::Lowpass | FilterType::Highpass => 1,
            FilterType::Bandpass | FilterType::Bandstop => 2,
        }
    }
}

impl FromStr for FilterType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowpass" | "Lowpass" | "low" => Ok(FilterType::Lowpass),
            "highpass" | "Highpass" | "high" => Ok(FilterType::Highpass),
            "bandpass" | "Bandpass" => Ok(FilterType::Bandpass),
            "bandstop" | "Bandstop" => Ok(FilterType::Bandstop),
            other => Err(FilterError::InvalidFilterType(other.to_string())),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterType::Lowpass => write!(f, "lowpass"),
            FilterType::Highpass => write!(f, "highpass"),
            FilterType::Bandpass => write!(f, "bandpass"),
            FilterType::Bandstop => write!(f, "bandstop"),
        }
    }
}

/// Classical design families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignFamily {
    #[serde(rename = "butter")]
    Butterworth,
    #[serde(rename = "cheby1")]
    Chebyshev1,
    #[serde(rename = "cheby2")]
    Chebyshev2,
}

impl FromStr for DesignFamily {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butter" | "butterworth" => Ok(DesignFamily::Butterworth),
            "cheby1" | "chebyshev1" | "chebyshev-type-1" => Ok(DesignFamily::Chebyshev1),
            "cheby2" | "chebyshev2" | "chebyshev-type-2" => Ok(DesignFamily::Chebyshev2),
            other => Err(FilterError::InvalidDesignFamily(other.to_string())),
        }
    }
}

impl fmt::Display for DesignFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignFamily::Butterworth => write!(f, "butter"),
            DesignFamily::Chebyshev1 => write!(f, "cheby1"),
            DesignFamily::Chebyshev2 => write!(f, "cheby2"),
        }
    }
}

/// A design family together with the one parameter it uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Design {
    /// Maximally flat passband
    Butterworth,
    /// Equiripple passband; `ripple_db` is the maximum passband ripple
    Chebyshev1 { ripple_db: f64 },
    /// Equiripple stopband; `attenuation_db` is the minimum stopband attenuation
    Chebyshev2 { attenuation_db: f64 },
}

impl Design {
    /// Pick the family's parameter out of a (ripple, attenuation) pair
    pub fn from_family(family: DesignFamily, ripple_db: f64, attenuation_db: f64) -> Self {
        match family {
            DesignFamily::Butterworth => Design::Butterworth,
            DesignFamily::Chebyshev1 => Design::Chebyshev1 { ripple_db },
            DesignFamily::Chebyshev2 => Design::Chebyshev2 { attenuation_db },
        }
    }

    pub fn family(&self) -> DesignFamily {
        match self {
            Design::Butterworth => DesignFamily::Butterworth,
            Design::Chebyshev1 { .. } => DesignFamily::Chebyshev1,
            Design::Chebyshev2 { .. } => DesignFamily::Chebyshev2,
        }
    }
}

impl Default for Design {
    fn default() -> Self {
        Design::Butterworth
    }
}

/// Cutoff frequency specification
///
/// One frequency for lowpass/highpass, a `[low, high]` band edge pair for
/// bandpass/bandstop. Deserializes from either a bare number or a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cutoff {
    Single(f64),
    Band([f64; 2]),
}

impl Cutoff {
    /// Cutoff values in order
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Cutoff::Single(f) => std::slice::from_ref(f),
            Cutoff::Band(edges) => edges,
        }
    }

    /// Apply `op` to every cutoff value
    pub fn map(self, op: impl Fn(f64) -> f64) -> Self {
        match self {
            Cutoff::Single(f) => Cutoff::Single(op(f)),
            Cutoff::Band([lo, hi]) => Cutoff::Band([op(lo), op(hi)]),
        }
    }
}

impl From<f64> for Cutoff {
    fn from(f: f64) -> Self {
        Cutoff::Single(f)
    }
}

impl From<[f64; 2]> for Cutoff {
    fn from(edges: [f64; 2]) -> Self {
        Cutoff::Band(edges)
    }
}

impl From<(f64, f64)> for Cutoff {
    fn from((lo, hi): (f64, f64)) -> Self {
        Cutoff::Band([lo, hi])
    }
}

/// Map cutoff frequencies in Hz onto the Nyquist-normalised scale (1.0 = Nyquist).
///
/// A sample rate of zero means the cutoffs are already normalised and they are
/// returned unchanged. Works on a copy; the caller's values are untouched.
pub fn normalize_cutoff(cutoff: Cutoff, sample_rate_hz: f64) -> Cutoff {
    if sample_rate_hz > 0.0 {
        cutoff.map(|f| f / sample_rate_hz * 2.0)
    } else {
        cutoff
    }
}

fn default_design() -> String {
    DesignFamily::Butterworth.to_string()
}

fn default_ripple_db() -> f64 {
    1.0
}

fn default_attenuation_db() -> f64 {
    1.0
}

/// String-typed filter parameters, as written in configs
///
/// # Example
/// ```
/// use cascade_iir::FilterParams;
///
/// // 3rd order Chebyshev I mains notch for signals sampled at 1 kHz
/// let mains = FilterParams::new(3, [45.0, 55.0], "bandstop")
///     .design("cheby1")
///     .ripple_db(0.01)
///     .sample_rate_hz(1000.0);
/// assert!(mains.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Total filter order (may be odd)
    pub order: usize,
    /// Cutoff frequency or band edges
    pub cutoff: Cutoff,
    /// lowpass, highpass, bandpass or bandstop
    #[serde(alias = "type")]
    pub filter_type: String,
    /// butter, cheby1 or cheby2
    #[serde(default = "default_design")]
    pub design: String,
    /// Maximum passband ripple in dB (cheby1 only)
    #[serde(default = "default_ripple_db", alias = "rp")]
    pub ripple_db: f64,
    /// Minimum stopband attenuation in dB (cheby2 only)
    #[serde(default = "default_attenuation_db", alias = "rs")]
    pub attenuation_db: f64,
    /// Sampling frequency in Hz; 0 means cutoffs are already normalised
    #[serde(default, alias = "fs")]
    pub sample_rate_hz: f64,
}

impl FilterParams {
    /// Create parameters with the default design (butter), ripple and attenuation
    /// of 1 dB, and normalised cutoffs.
    pub fn new(order: usize, cutoff: impl Into<Cutoff>, filter_type: &str) -> Self {
        Self {
            order,
            cutoff: cutoff.into(),
            filter_type: filter_type.to_string(),
            design: default_design(),
            ripple_db: default_ripple_db(),
            attenuation_db: default_attenuation_db(),
            sample_rate_hz: 0.0,
        }
    }

    pub fn design(mut self, design: &str) -> Self {
        self.design = design.to_string();
        self
    }

    pub fn ripple_db(mut self, ripple_db: f64) -> Self {
        self.ripple_db = ripple_db;
        self
    }

    pub fn attenuation_db(mut self, attenuation_db: f64) -> Self {
        self.attenuation_db = attenuation_db;
        self
    }

    pub fn sample_rate_hz(mut self, sample_rate_hz: f64) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    /// Check design family, filter type and sample rate, in that order.
    ///
    /// Everything else (order, cutoff range, cutoff count, ripple sign) is left to
    /// the coefficient provider.
    pub fn validate(&self) -> FilterResult<FilterSpec> {
        let family: DesignFamily = self.design.parse()?;
        let filter_type: FilterType = self.filter_type.parse()?;
        if self.sample_rate_hz < 0.0 {
            return Err(FilterError::NegativeSampleRate(self.sample_rate_hz));
        }

        Ok(FilterSpec {
            order: self.order,
            cutoff: self.cutoff,
            filter_type,
            design: Design::from_family(family, self.ripple_db, self.attenuation_db),
            sample_rate_hz: (self.sample_rate_hz > 0.0).then_some(self.sample_rate_hz),
        })
    }

    /// Parse from TOML, falling back to JSON
    pub fn parse(content: &str) -> crate::error::ConfigResult<Self> {
        crate::config::parse_toml_or_json(content)
    }

    /// Load from a TOML or JSON file
    pub fn load(path: &std::path::Path) -> crate::error::ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Validated, strongly typed filter description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub order: usize,
    /// Cutoffs in Hz when `sample_rate_hz` is set, otherwise Nyquist-normalised
    pub cutoff: Cutoff,
    pub filter_type: FilterType,
    pub design: Design,
    /// `None` when cutoffs are already normalised
    pub sample_rate_hz: Option<f64>,
}

impl FilterSpec {
    /// Butterworth filter with normalised cutoffs
    pub fn new(order: usize, cutoff: impl Into<Cutoff>, filter_type: FilterType) -> Self {
        Self {
            order,
            cutoff: cutoff.into(),
            filter_type,
            design: Design::Butterworth,
            sample_rate_hz: None,
        }
    }

    pub fn with_design(mut self, design: Design) -> Self {
        self.design = design;
        self
    }

    /// Interpret cutoffs as Hz at this sampling frequency
    pub fn with_sample_rate(mut self, sample_rate_hz: f64) -> Self {
        self.sample_rate_hz = Some(sample_rate_hz);
        self
    }

    /// Cutoffs on the Nyquist-normalised scale
    pub fn normalized_cutoff(&self) -> FilterResult<Cutoff> {
        match self.sample_rate_hz {
            Some(fs) if fs < 0.0 => Err(FilterError::NegativeSampleRate(fs)),
            Some(fs) => Ok(normalize_cutoff(self.cutoff, fs)),
            None => Ok(self.cutoff),
        }
    }
}
