//! Cascade filter engine
//!
//! Owns an ordered list of second-order sections plus two delay registers per
//! section, and filters one sample at a time. The enabled/disabled decision is
//! made once at construction:
//! - **Enabled**: the provider returned a section list; `filter` runs the cascade.
//! - **Disabled**: validation or design failed; `filter` is the identity and the
//!   reason is kept for diagnostics.
//!
//! The graceful constructors ([`CascadeFilterEngine::new`],
//! [`CascadeFilterEngine::from_spec`], [`CascadeFilterEngine::with_provider`]) never
//! fail; they log a warning and fall back to pass-through. The `try_` variants
//! return the error instead.

use crate::design::{CoefficientProvider, DesignRequest, ZpkDesigner};
use crate::error::{FilterError, FilterResult};
use crate::params::{FilterParams, FilterSpec};
use crate::section::SecondOrderSection;
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Delay registers of one section: `[w1, w2]`
type SectionState = [f64; 2];

#[derive(Debug, Clone)]
enum Cascade {
    Enabled {
        sections: Vec<SecondOrderSection>,
        state: Vec<SectionState>,
    },
    Disabled {
        reason: FilterError,
    },
}

/// Per-sample IIR filter made of cascaded biquads
///
/// Each instance owns its state; use one engine per channel.
#[derive(Debug, Clone)]
pub struct CascadeFilterEngine {
    cascade: Cascade,
}

impl CascadeFilterEngine {
    /// Build from loose parameters, degrading to pass-through on any error
    pub fn new(params: &FilterParams) -> Self {
        Self::try_new(params).unwrap_or_else(Self::degrade)
    }

    /// Build from loose parameters, returning the first error
    pub fn try_new(params: &FilterParams) -> FilterResult<Self> {
        let spec = params.validate()?;
        Self::try_with_provider(&spec, &ZpkDesigner)
    }

    /// Build from a validated spec with the default designer
    pub fn from_spec(spec: &FilterSpec) -> Self {
        Self::with_provider(spec, &ZpkDesigner)
    }

    /// Build with a specific coefficient provider, degrading to pass-through on error
    pub fn with_provider(spec: &FilterSpec, provider: &dyn CoefficientProvider) -> Self {
        Self::try_with_provider(spec, provider).unwrap_or_else(Self::degrade)
    }

    /// Build with a specific coefficient provider, returning the first error
    pub fn try_with_provider(
        spec: &FilterSpec,
        provider: &dyn CoefficientProvider,
    ) -> FilterResult<Self> {
        let request = DesignRequest::from_spec(spec)?;
        let sections = provider.design(&request)?;
        if sections.is_empty() {
            return Err(FilterError::ProviderRejected(format!(
                "{} provider returned no sections",
                provider.name()
            )));
        }

        debug!(
            "Designed {} {} order {} as {} sections ({} provider)",
            spec.design.family(),
            spec.filter_type,
            spec.order,
            sections.len(),
            provider.name()
        );

        Ok(Self::enabled(sections))
    }

    /// Run a pre-built section list. An empty list gives a disabled engine.
    pub fn from_sections(sections: Vec<SecondOrderSection>) -> Self {
        if sections.is_empty() {
            return Self::disabled(FilterError::ProviderRejected(
                "empty section list".to_string(),
            ));
        }
        Self::enabled(sections)
    }

    /// Pass-through engine that remembers why it is not filtering
    pub fn disabled(reason: FilterError) -> Self {
        Self {
            cascade: Cascade::Disabled { reason },
        }
    }

    fn enabled(sections: Vec<SecondOrderSection>) -> Self {
        let state = vec![[0.0; 2]; sections.len()];
        Self {
            cascade: Cascade::Enabled { sections, state },
        }
    }

    fn degrade(reason: FilterError) -> Self {
        warn!("Filter disabled, passing samples through unchanged: {}", reason);
        Self::disabled(reason)
    }

    /// Filter one sample.
    ///
    /// Each section runs
    /// ```text
    /// acc_in  = x - a1*w1 - a2*w2
    /// y       = b0*acc_in + b1*w1 + b2*w2
    /// w2, w1  = w1, acc_in
    /// ```
    /// and feeds its output to the next. A disabled engine returns `x`.
    #[inline]
    pub fn filter(&mut self, x: f64) -> f64 {
        match &mut self.cascade {
            Cascade::Enabled { sections, state } => {
                let mut signal = x;
                for (s, w) in sections.iter().zip(state.iter_mut()) {
                    let acc_in = signal + w[0] * -s.a1 + w[1] * -s.a2;
                    let acc_out = acc_in * s.b0 + w[0] * s.b1 + w[1] * s.b2;
                    w[1] = w[0];
                    w[0] = acc_in;
                    signal = acc_out;
                }
                signal
            }
            Cascade::Disabled { .. } => x,
        }
    }

    /// Filter a block of samples; `output` receives one value per `input` sample
    pub fn process_block(&mut self, input: &[f64], output: &mut [f64]) {
        debug_assert_eq!(input.len(), output.len(), "Block length mismatch");
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.filter(*x);
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.cascade, Cascade::Enabled { .. })
    }

    /// Why the engine is passing samples through, if it is
    pub fn disabled_reason(&self) -> Option<&FilterError> {
        match &self.cascade {
            Cascade::Enabled { .. } => None,
            Cascade::Disabled { reason } => Some(reason),
        }
    }

    /// Sections in processing order (empty when disabled)
    pub fn sections(&self) -> &[SecondOrderSection] {
        match &self.cascade {
            Cascade::Enabled { sections, .. } => sections.as_slice(),
            Cascade::Disabled { .. } => &[],
        }
    }

    pub fn num_sections(&self) -> usize {
        self.sections().len()
    }

    /// Total order realised by the cascade
    pub fn order(&self) -> usize {
        self.sections().iter().map(|s| s.order()).sum()
    }

    /// All sections have their poles inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.sections().iter().all(|s| s.is_stable())
    }

    /// Complex response at Nyquist-normalised frequency `freq` (1.0 = Nyquist)
    pub fn response(&self, freq: f64) -> Complex64 {
        let omega = PI * freq;
        self.sections()
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(omega))
    }

    /// Magnitude response in dB at Nyquist-normalised frequency `freq`
    pub fn magnitude_db(&self, freq: f64) -> f64 {
        20.0 * self.response(freq).norm().log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Cutoff, Design, FilterType};
    use biquad::{Biquad, DirectForm2Transposed};

    fn lowpass(order: usize, wn: f64) -> CascadeFilterEngine {
        CascadeFilterEngine::try_new(&FilterParams::new(order, wn, "lowpass")).unwrap()
    }

    #[test]
    fn test_section_count_matches_order() {
        let even = lowpass(6, 0.2);
        assert_eq!(even.num_sections(), 3);
        assert_eq!(even.order(), 6);

        let odd = lowpass(5, 0.2);
        assert_eq!(odd.num_sections(), 3);
        assert_eq!(odd.order(), 5);
        assert_eq!(odd.sections().iter().filter(|s| s.is_first_order()).count(), 1);
    }

    #[test]
    fn test_zero_input_gives_zero_output() {
        let mut engine = lowpass(4, 0.3);
        for _ in 0..10 {
            assert_eq!(engine.filter(0.0), 0.0);
        }
    }

    #[test]
    fn test_pass_through_when_disabled() {
        let params = FilterParams::new(2, 0.2, "lowpass").design("not-a-design");
        let mut engine = CascadeFilterEngine::new(&params);
        assert!(!engine.is_enabled());
        assert_eq!(
            engine.disabled_reason(),
            Some(&FilterError::InvalidDesignFamily("not-a-design".to_string()))
        );
        assert_eq!(engine.filter(5.0), 5.0);
        assert_eq!(engine.filter(-3.2), -3.2);
        assert_eq!(engine.num_sections(), 0);
        assert_eq!(engine.magnitude_db(0.5), 0.0);
    }

    #[test]
    fn test_provider_rejection_degrades() {
        let engine = CascadeFilterEngine::new(&FilterParams::new(2, [0.1, 0.2], "lowpass"));
        assert!(matches!(
            engine.disabled_reason(),
            Some(FilterError::ProviderRejected(_))
        ));
    }

    #[test]
    fn test_strict_constructor_reports_error() {
        let params = FilterParams::new(2, 0.2, "lowpass").sample_rate_hz(-48000.0);
        assert_eq!(
            CascadeFilterEngine::try_new(&params).err(),
            Some(FilterError::NegativeSampleRate(-48000.0))
        );
    }

    #[test]
    fn test_recursion_matches_hand_computation() {
        let s = SecondOrderSection::new([0.5, 0.25, 0.125], [-0.5, 0.25]);
        let mut engine = CascadeFilterEngine::from_sections(vec![s]);

        // x = 1: acc_in = 1, y = 0.5
        assert_eq!(engine.filter(1.0), 0.5);
        // x = 0: acc_in = 0.5, y = 0.25 + 0.25 = 0.5
        assert_eq!(engine.filter(0.0), 0.5);
        // x = 0: acc_in = 0.25 - 0.25 = 0, y = 0.125 + 0.125
        assert_eq!(engine.filter(0.0), 0.25);
    }

    #[test]
    fn test_empty_sections_disable() {
        let mut engine = CascadeFilterEngine::from_sections(Vec::new());
        assert!(!engine.is_enabled());
        assert_eq!(engine.filter(1.5), 1.5);
    }

    #[test]
    fn test_impulse_response_decays() {
        let mut engine = CascadeFilterEngine::from_spec(
            &FilterSpec::new(8, Cutoff::Band([0.2, 0.3]), FilterType::Bandpass)
                .with_design(Design::Chebyshev1 { ripple_db: 0.5 }),
        );
        assert!(engine.is_stable());

        let mut peak_tail: f64 = 0.0;
        for n in 0..4000 {
            let y = engine.filter(if n == 0 { 1.0 } else { 0.0 });
            assert!(y.is_finite());
            assert!(y.abs() < 10.0);
            if n >= 3500 {
                peak_tail = peak_tail.max(y.abs());
            }
        }
        assert!(peak_tail < 1e-6, "tail peak {}", peak_tail);
    }

    #[test]
    fn test_normalised_and_hz_cutoffs_agree() {
        let mut a = CascadeFilterEngine::new(&FilterParams::new(4, 0.2, "lowpass"));
        let mut b =
            CascadeFilterEngine::new(&FilterParams::new(4, 100.0, "lowpass").sample_rate_hz(1000.0));
        for n in 0..200 {
            let x = (n as f64 * 0.37).sin() + if n % 7 == 0 { 1.0 } else { 0.0 };
            assert_eq!(a.filter(x).to_bits(), b.filter(x).to_bits());
        }
    }

    #[test]
    fn test_closure_provider() {
        let fixed = |_: &DesignRequest| -> FilterResult<Vec<SecondOrderSection>> {
            Ok(vec![SecondOrderSection::new([2.0, 0.0, 0.0], [0.0, 0.0])])
        };
        let spec = FilterSpec::new(2, 0.2, FilterType::Lowpass);
        let mut engine = CascadeFilterEngine::with_provider(&spec, &fixed);
        assert_eq!(engine.filter(1.5), 3.0);
    }

    #[test]
    fn test_empty_provider_output_is_rejected() {
        let nothing = |_: &DesignRequest| -> FilterResult<Vec<SecondOrderSection>> { Ok(Vec::new()) };
        let spec = FilterSpec::new(2, 0.2, FilterType::Lowpass);
        assert!(matches!(
            CascadeFilterEngine::try_with_provider(&spec, &nothing),
            Err(FilterError::ProviderRejected(_))
        ));
    }

    #[test]
    fn test_matches_biquad_crate_cascade() {
        let mut engine = lowpass(6, 0.15);
        let mut reference: Vec<DirectForm2Transposed<f64>> = engine
            .sections()
            .iter()
            .map(|&s| DirectForm2Transposed::<f64>::new(s.into()))
            .collect();

        for n in 0..500 {
            let x = ((n * 31 % 17) as f64 - 8.0) / 8.0;
            let expected = reference.iter_mut().fold(x, |signal, stage| stage.run(signal));
            assert!((engine.filter(x) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_response_at_cutoff() {
        let engine = lowpass(4, 0.3);
        assert!((engine.magnitude_db(0.3) + 3.0103).abs() < 1e-3);
        assert!(engine.magnitude_db(0.01).abs() < 1e-6);
    }
}
