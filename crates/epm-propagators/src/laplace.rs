//! Short-range discrete-Laplacian kernel.

use crate::propagator::Propagator;

/// The fixed 3x3 short-range kernel: self term -1, the four orthogonal
/// neighbours +0.25 each, corners zero.
///
/// The entries sum to zero, so this kernel satisfies the stress-imposed
/// convention by construction; redistribution is purely diffusive.
///
/// # Examples
///
/// ```
/// use epm_core::Imposed;
/// use epm_propagators::{follows_conventions, laplace_propagator};
///
/// let kernel = laplace_propagator();
/// assert_eq!(kernel.self_term(), -1.0);
/// assert!(follows_conventions(&kernel, Imposed::Stress));
/// ```
pub fn laplace_propagator() -> Propagator {
    let values = vec![
        0.0, 0.25, 0.0, //
        0.25, -1.0, 0.25, //
        0.0, 0.25, 0.0,
    ];
    Propagator::from_raw(values, vec![-1, 0, 1], vec![-1, 0, 1])
}
