//! # cascade-iir - Cascaded Biquad IIR Filters
//!
//! Real-time, sample-by-sample IIR filtering built from second-order sections.
//!
//! ## Core Pieces
//!
//! - **Cascade engine**: [`CascadeFilterEngine`] owns a list of biquads and their
//!   delay registers and advances the whole cascade with one `filter(x)` call
//! - **Coefficient providers**: the [`CoefficientProvider`] trait turns an order,
//!   cutoff(s), filter type and design family into sections. [`ZpkDesigner`] is the
//!   default (Butterworth, Chebyshev I, Chebyshev II; lowpass, highpass, bandpass,
//!   bandstop); [`CookbookDesigner`] builds Butterworth lowpass/highpass from `biquad`
//!   cookbook stages
//! - **Graceful degradation**: a misconfigured filter becomes a pass-through engine
//!   and logs a warning instead of failing; `try_` constructors report the error
//! - **Configs and chains**: filters load from TOML or JSON and compose serially in a
//!   [`FilterChain`]
//!
//! ## Quick Start
//!
//! ```rust
//! use cascade_iir::{CascadeFilterEngine, FilterParams};
//!
//! // Remove 50 Hz mains hum from a signal sampled at 1 kHz
//! let params = FilterParams::new(3, [45.0, 55.0], "bandstop")
//!     .design("cheby1")
//!     .ripple_db(0.01)
//!     .sample_rate_hz(1000.0);
//! let mut notch = CascadeFilterEngine::new(&params);
//! assert!(notch.is_enabled());
//!
//! let y = notch.filter(0.5);
//! assert!(y.is_finite());
//! ```
//!
//! A bad configuration never interrupts the stream:
//!
//! ```rust
//! use cascade_iir::{CascadeFilterEngine, FilterParams};
//!
//! let mut engine = CascadeFilterEngine::new(&FilterParams::new(2, 0.1, "lowpass").design("not-a-design"));
//! assert!(!engine.is_enabled());
//! assert_eq!(engine.filter(5.0), 5.0);
//! ```

pub mod chain;
pub mod config;
pub mod design;
pub mod engine;
pub mod error;
pub mod params;
pub mod section;

pub use chain::{ChainStage, FilterChain};
pub use config::{ChainConfig, NamedFilter};
pub use design::{CoefficientProvider, CookbookDesigner, DesignRequest, ZpkDesigner};
pub use engine::CascadeFilterEngine;
pub use error::{ConfigError, ConfigResult, FilterError, FilterResult};
pub use params::{normalize_cutoff, Cutoff, Design, DesignFamily, FilterParams, FilterSpec, FilterType};
pub use section::SecondOrderSection;
