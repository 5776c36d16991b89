//! Pairing of zeros and poles into second-order sections
//!
//! Poles are taken closest-to-the-unit-circle first and each pole pair is given
//! the zero(s) nearest to it. The resulting list is reversed so the sections
//! with the sharpest resonances run last, and the overall gain is folded into
//! the first section.

use super::zpk::Zpk;
use crate::error::{FilterError, FilterResult};
use crate::section::SecondOrderSection;
use num_complex::Complex64;

/// Tolerance (relative to magnitude) below which an imaginary part counts as zero
const REAL_TOL: f64 = 100.0 * f64::EPSILON;

/// Tolerance (relative to magnitude) for matching a root with its conjugate
const CONJUGATE_TOL: f64 = 1e-8;

const ORIGIN: Complex64 = Complex64 { re: 0.0, im: 0.0 };

#[derive(Clone, Copy, PartialEq)]
enum RootKind {
    Real,
    Complex,
    Any,
}

fn is_real(c: &Complex64) -> bool {
    c.im == 0.0
}

/// Split roots into conjugate-pair representatives (positive imaginary part) and
/// real roots. Pairs are averaged with their conjugate to remove rounding noise.
///
/// Complex representatives come first, sorted by real part then imaginary part,
/// followed by the real roots in ascending order.
fn split_conjugates(roots: &[Complex64]) -> FilterResult<Vec<Complex64>> {
    let mut reals = Vec::new();
    let mut positive = Vec::new();
    let mut negative = Vec::new();

    for &r in roots {
        if r.im.abs() <= REAL_TOL * r.norm() {
            reals.push(r.re);
        } else if r.im > 0.0 {
            positive.push(r);
        } else {
            negative.push(r);
        }
    }

    if positive.len() != negative.len() {
        return Err(FilterError::ProviderRejected(
            "complex root without a matching conjugate".to_string(),
        ));
    }

    let mut pairs = Vec::with_capacity(positive.len());
    for p in positive {
        let nearest = negative
            .iter()
            .enumerate()
            .map(|(i, n)| (i, (p - n.conj()).norm()))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match nearest {
            Some((i, dist)) if dist <= CONJUGATE_TOL * p.norm().max(1.0) => {
                let n = negative.swap_remove(i);
                pairs.push((p + n.conj()) / 2.0);
            }
            _ => {
                return Err(FilterError::ProviderRejected(format!(
                    "complex root {} has no matching conjugate",
                    p
                )))
            }
        }
    }

    pairs.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
    reals.sort_by(|a, b| a.total_cmp(b));

    Ok(pairs
        .into_iter()
        .chain(reals.into_iter().map(|re| Complex64::new(re, 0.0)))
        .collect())
}

/// Index of the entry of `from` closest to `to`, restricted to `kind`
fn nearest(from: &[Complex64], to: Complex64, kind: RootKind) -> Option<usize> {
    let mut order: Vec<usize> = (0..from.len()).collect();
    order.sort_by(|&a, &b| (from[a] - to).norm().total_cmp(&(from[b] - to).norm()));

    order.into_iter().find(|&i| match kind {
        RootKind::Any => true,
        RootKind::Real => is_real(&from[i]),
        RootKind::Complex => !is_real(&from[i]),
    })
}

/// Index of the first root closest to the unit circle
fn closest_to_unit_circle<'a>(roots: impl Iterator<Item = (usize, &'a Complex64)>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, r) in roots {
        let distance = (1.0 - r.norm()).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

/// One section with unit gain from two zeros and two poles
fn section_from_roots(z: [Complex64; 2], p: [Complex64; 2]) -> SecondOrderSection {
    let b1 = -(z[0] + z[1]);
    let b2 = z[0] * z[1];
    let a1 = -(p[0] + p[1]);
    let a2 = p[0] * p[1];
    SecondOrderSection::new([1.0, b1.re, b2.re], [a1.re, a2.re])
}

fn take_nearest(
    from: &mut Vec<Complex64>,
    to: Complex64,
    kind: RootKind,
) -> FilterResult<Complex64> {
    nearest(from.as_slice(), to, kind)
        .map(|i| from.remove(i))
        .ok_or_else(|| FilterError::ProviderRejected("unbalanced zeros while pairing sections".to_string()))
}

/// Convert digital zeros/poles/gain into an ordered list of second-order sections.
///
/// A filter of order N yields `ceil(N / 2)` sections; an odd order produces one
/// single-pole stage (`a2 = 0`).
pub fn zpk_to_sos(zpk: &Zpk) -> FilterResult<Vec<SecondOrderSection>> {
    if zpk.zeros.is_empty() && zpk.poles.is_empty() {
        return Ok(vec![SecondOrderSection::new([zpk.gain, 0.0, 0.0], [0.0, 0.0])]);
    }

    let mut zeros = zpk.zeros.clone();
    let mut poles = zpk.poles.clone();
    let len = zeros.len().max(poles.len());
    zeros.resize(len, ORIGIN);
    poles.resize(len, ORIGIN);
    if len % 2 == 1 {
        zeros.push(ORIGIN);
        poles.push(ORIGIN);
    }
    let n_sections = (len + 1) / 2;

    let mut z = split_conjugates(&zeros)?;
    let mut p = split_conjugates(&poles)?;

    let mut sections = Vec::with_capacity(n_sections);
    for _ in 0..n_sections {
        let p1_idx = closest_to_unit_circle(p.iter().enumerate()).ok_or_else(|| {
            FilterError::ProviderRejected("ran out of poles while pairing sections".to_string())
        })?;
        let p1 = p.remove(p1_idx);
        let real_poles_left = p.iter().filter(|r| is_real(r)).count();

        let section = if is_real(&p1) && real_poles_left == 0 {
            // Last real pole: first-order stage with the nearest real zero
            let z1 = take_nearest(&mut z, p1, RootKind::Real)?;
            section_from_roots([z1, ORIGIN], [p1, ORIGIN])
        } else if p.len() + 1 == z.len()
            && !is_real(&p1)
            && real_poles_left == 1
            && z.iter().filter(|r| is_real(r)).count() == 1
        {
            // Keep the lone real zero for the lone real pole
            let z1 = take_nearest(&mut z, p1, RootKind::Complex)?;
            section_from_roots([z1, z1.conj()], [p1, p1.conj()])
        } else {
            let p2 = if is_real(&p1) {
                let idx = closest_to_unit_circle(p.iter().enumerate().filter(|(_, r)| is_real(r)))
                    .ok_or_else(|| {
                        FilterError::ProviderRejected("unpaired real pole".to_string())
                    })?;
                p.remove(idx)
            } else {
                p1.conj()
            };

            let (z1, z2) = if z.is_empty() {
                (ORIGIN, ORIGIN)
            } else {
                let z1 = take_nearest(&mut z, p1, RootKind::Any)?;
                if !is_real(&z1) {
                    (z1, z1.conj())
                } else if z.is_empty() {
                    (z1, ORIGIN)
                } else {
                    (z1, take_nearest(&mut z, p1, RootKind::Real)?)
                }
            };

            section_from_roots([z1, z2], [p1, p2])
        };

        sections.push(section);
    }

    if !p.is_empty() || !z.is_empty() {
        return Err(FilterError::ProviderRejected(
            "zeros and poles left over after pairing".to_string(),
        ));
    }

    sections.reverse();
    if let Some(first) = sections.first_mut() {
        first.b0 *= zpk.gain;
        first.b1 *= zpk.gain;
        first.b2 *= zpk.gain;
    }

    Ok(sections)
}
