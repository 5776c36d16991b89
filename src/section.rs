//! Second-order section (biquad) coefficients
//!
//! ```text
//! H(z) = (b0 + b1*z^-1 + b2*z^-2) / (a0 + a1*z^-1 + a2*z^-2),  a0 = 1
//! ```
//!
//! A first-order (single-pole) stage is stored as a degenerate section with `a2 = 0`.

use num_complex::Complex64;

/// Coefficients of one biquad in gain-normalised form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondOrderSection {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl SecondOrderSection {
    /// Create a section from feed-forward and feedback taps (a0 = 1)
    pub fn new(b: [f64; 3], a: [f64; 2]) -> Self {
        Self {
            b0: b[0],
            b1: b[1],
            b2: b[2],
            a0: 1.0,
            a1: a[0],
            a2: a[1],
        }
    }

    /// Build from a `[b0, b1, b2, a0, a1, a2]` row, dividing through by `a0`.
    ///
    /// Returns `None` if `a0` is zero or not finite.
    pub fn from_row(row: [f64; 6]) -> Option<Self> {
        let a0 = row[3];
        if a0 == 0.0 || !a0.is_finite() {
            return None;
        }
        Some(Self::new(
            [row[0] / a0, row[1] / a0, row[2] / a0],
            [row[4] / a0, row[5] / a0],
        ))
    }

    /// `[b0, b1, b2, a0, a1, a2]`
    pub fn to_row(&self) -> [f64; 6] {
        [self.b0, self.b1, self.b2, self.a0, self.a1, self.a2]
    }

    /// Identity section (y = x)
    pub fn passthrough() -> Self {
        Self::new([1.0, 0.0, 0.0], [0.0, 0.0])
    }

    /// Degree of the denominator, i.e. the number of poles away from the origin
    pub fn order(&self) -> usize {
        if self.a2 != 0.0 {
            2
        } else if self.a1 != 0.0 {
            1
        } else {
            0
        }
    }

    /// True for a single-pole stage stored as a biquad
    pub fn is_first_order(&self) -> bool {
        self.order() == 1
    }

    /// Poles strictly inside the unit circle.
    ///
    /// For `1 + a1*z^-1 + a2*z^-2` this is the stability triangle
    /// `|a2| < 1` and `|a1| < 1 + a2`.
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    /// Complex response at normalised angular frequency `omega` (radians/sample)
    pub fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = self.b0 + z1 * self.b1 + z2 * self.b2;
        let den = self.a0 + z1 * self.a1 + z2 * self.a2;
        num / den
    }
}

impl From<biquad::Coefficients<f64>> for SecondOrderSection {
    fn from(c: biquad::Coefficients<f64>) -> Self {
        Self::new([c.b0, c.b1, c.b2], [c.a1, c.a2])
    }
}

impl From<SecondOrderSection> for biquad::Coefficients<f64> {
    fn from(s: SecondOrderSection) -> Self {
        biquad::Coefficients {
            a1: s.a1,
            a2: s.a2,
            b0: s.b0,
            b1: s.b1,
            b2: s.b2,
        }
    }
}
