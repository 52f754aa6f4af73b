//! Long-range quadrupolar (Eshelby) kernel on a periodic lattice.
//!
//! The far-field elastic Green's function of a plastic inclusion has
//! the Fourier symbol `G(q) = -4 qx^2 qy^2 / |q|^4`. This module
//! evaluates its inverse transform on a periodic `l x l` lattice and
//! normalizes the result so the self term is exactly -1, with the zero
//! mode fixed by the requested loading convention.

use crate::propagator::Propagator;
use epm_core::{ConfigError, Imposed};

/// Build the periodic `l x l` Eshelby kernel for the given loading
/// convention.
///
/// Invariants of the result:
/// - self term exactly -1;
/// - total sum 0 for [`Imposed::Stress`], -1 for [`Imposed::Strain`]
///   (the strain variant spreads a uniform `-1/(l^2 - 1)` over every
///   non-self entry, leaving the self term untouched);
/// - offsets in FFT frequency order (`0, 1, ..., -2, -1`) on both axes,
///   so the kernel covers the whole lattice.
///
/// Construction is `O(l^3)` via a row-column decomposition of the
/// inverse transform; it runs once per simulation, never per failure.
///
/// # Errors
///
/// Returns [`ConfigError::KernelTooSmall`] for `l < 3`.
pub fn eshelby_propagator(l: usize, imposed: Imposed) -> Result<Propagator, ConfigError> {
    if l < 3 {
        return Err(ConfigError::KernelTooSmall { size: l });
    }
    let n = l * l;

    // Signed FFT frequencies: 0, 1, ..., then the negative half.
    let freqs: Vec<i32> = (0..l)
        .map(|i| {
            if i <= (l - 1) / 2 {
                i as i32
            } else {
                i as i32 - l as i32
            }
        })
        .collect();

    // Fourier symbol, zero mode excluded. The 2*pi/l scale of the
    // wavevectors cancels in the ratio, so integer frequencies suffice.
    let mut ghat = vec![0.0f64; n];
    for (a, &fa) in freqs.iter().enumerate() {
        let qx2 = (fa as f64) * (fa as f64);
        for (b, &fb) in freqs.iter().enumerate() {
            let qy2 = (fb as f64) * (fb as f64);
            let q2 = qx2 + qy2;
            if q2 > 0.0 {
                ghat[a * l + b] = -4.0 * qx2 * qy2 / (q2 * q2);
            }
        }
    }

    // Inverse transform in two O(l^3) passes using
    // cos(x + y) = cos(x)cos(y) - sin(x)sin(y). The symbol is real and
    // even, so the imaginary part vanishes identically.
    let mut cos_t = vec![0.0f64; l];
    let mut sin_t = vec![0.0f64; l];
    for k in 0..l {
        let theta = 2.0 * std::f64::consts::PI * k as f64 / l as f64;
        cos_t[k] = theta.cos();
        sin_t[k] = theta.sin();
    }

    let mut t_cos = vec![0.0f64; n];
    let mut t_sin = vec![0.0f64; n];
    for a in 0..l {
        for b in 0..l {
            let v = ghat[a * l + b];
            if v == 0.0 {
                continue;
            }
            for c in 0..l {
                let k = (b * c) % l;
                t_cos[a * l + c] += v * cos_t[k];
                t_sin[a * l + c] += v * sin_t[k];
            }
        }
    }

    let inv_n = 1.0 / n as f64;
    let mut g = vec![0.0f64; n];
    for r in 0..l {
        for a in 0..l {
            let k = (a * r) % l;
            let (ca, sa) = (cos_t[k], sin_t[k]);
            for c in 0..l {
                g[r * l + c] += ca * t_cos[a * l + c] - sa * t_sin[a * l + c];
            }
        }
    }
    for v in g.iter_mut() {
        *v *= inv_n;
    }

    // Normalize the self term to exactly -1. The symbol is non-positive
    // and not identically zero, so g[0] < 0.
    let scale = -1.0 / g[0];
    for v in g.iter_mut() {
        *v *= scale;
    }

    // The zero mode was left at 0, so the kernel sums to 0: already the
    // stress convention. The strain convention drains -1/(l^2 - 1) per
    // non-self entry instead of touching the self term.
    if imposed == Imposed::Strain {
        let offset = -1.0 / (n as f64 - 1.0);
        // Flat index 0 is the self entry (zero offset on both axes).
        for v in g.iter_mut().skip(1) {
            *v += offset;
        }
    }

    Ok(Propagator::from_raw(g, freqs.clone(), freqs))
}
