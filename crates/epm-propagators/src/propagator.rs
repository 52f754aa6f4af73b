//! The interaction kernel and its convention checks.

use epm_core::{ConfigError, Imposed};

/// Tolerance for the kernel sum and self-term convention checks.
///
/// Kernel entries accumulate rounding from the inverse transform; 1e-8
/// is orders of magnitude above that while still catching any kernel
/// built for the wrong convention.
const CONVENTION_TOL: f64 = 1e-8;

/// A stress redistribution kernel on a periodic lattice.
///
/// Stores a dense `krows x kcols` value array in row-major order plus
/// one signed offset array per axis: entry `(a, b)` applies at
/// displacement `(distances_rows[a], distances_cols[b])` from the
/// failing site, wrapped periodically. The entry at displacement
/// `(0, 0)` is the self-interaction term, conventionally -1.
#[derive(Clone, Debug, PartialEq)]
pub struct Propagator {
    values: Vec<f64>,
    distances_rows: Vec<i32>,
    distances_cols: Vec<i32>,
}

impl Propagator {
    /// Build a kernel from raw parts, validating internal consistency.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyKernel`] if `values` is empty.
    /// - [`ConfigError::KernelValueCountMismatch`] if
    ///   `values.len() != distances_rows.len() * distances_cols.len()`.
    /// - [`ConfigError::MissingSelfOffset`] if either offset array has
    ///   no zero entry.
    /// - [`ConfigError::NonFiniteKernel`] if any value is NaN or
    ///   infinite.
    pub fn new(
        values: Vec<f64>,
        distances_rows: Vec<i32>,
        distances_cols: Vec<i32>,
    ) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::EmptyKernel);
        }
        let expected = distances_rows.len() * distances_cols.len();
        if values.len() != expected {
            return Err(ConfigError::KernelValueCountMismatch {
                values: values.len(),
                expected,
            });
        }
        if !distances_rows.contains(&0) {
            return Err(ConfigError::MissingSelfOffset { axis: "rows" });
        }
        if !distances_cols.contains(&0) {
            return Err(ConfigError::MissingSelfOffset { axis: "cols" });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteKernel { index });
        }
        Ok(Self {
            values,
            distances_rows,
            distances_cols,
        })
    }

    /// Construct from parts already known to be consistent.
    ///
    /// Used by the reference kernel builders, which produce valid data
    /// by construction.
    pub(crate) fn from_raw(
        values: Vec<f64>,
        distances_rows: Vec<i32>,
        distances_cols: Vec<i32>,
    ) -> Self {
        debug_assert_eq!(values.len(), distances_rows.len() * distances_cols.len());
        Self {
            values,
            distances_rows,
            distances_cols,
        }
    }

    /// Kernel extent along the row axis.
    pub fn krows(&self) -> usize {
        self.distances_rows.len()
    }

    /// Kernel extent along the column axis.
    pub fn kcols(&self) -> usize {
        self.distances_cols.len()
    }

    /// The dense value array, row-major `krows x kcols`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Signed row displacements, one per kernel row.
    pub fn distances_rows(&self) -> &[i32] {
        &self.distances_rows
    }

    /// Signed column displacements, one per kernel column.
    pub fn distances_cols(&self) -> &[i32] {
        &self.distances_cols
    }

    /// Kernel value at entry `(a, b)`.
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.values[a * self.kcols() + b]
    }

    /// The self-interaction term: the value at displacement `(0, 0)`.
    pub fn self_term(&self) -> f64 {
        // Guarded by construction: `new` rejects offset arrays without
        // a zero entry and `from_raw` is crate-internal.
        let a = self
            .distances_rows
            .iter()
            .position(|&d| d == 0)
            .expect("kernel has a zero row offset");
        let b = self
            .distances_cols
            .iter()
            .position(|&d| d == 0)
            .expect("kernel has a zero column offset");
        self.get(a, b)
    }

    /// Sum of every kernel entry.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Check that a kernel satisfies the invariants of the given loading
/// convention: self term -1, and total sum 0 (imposed stress) or -1
/// (imposed strain).
///
/// A sanity gate to run before simulation, never on the hot path.
pub fn follows_conventions(propagator: &Propagator, imposed: Imposed) -> bool {
    (propagator.self_term() + 1.0).abs() < CONVENTION_TOL
        && (propagator.sum() - imposed.kernel_sum()).abs() < CONVENTION_TOL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laplace_parts() -> (Vec<f64>, Vec<i32>, Vec<i32>) {
        (
            vec![0.0, 0.25, 0.0, 0.25, -1.0, 0.25, 0.0, 0.25, 0.0],
            vec![-1, 0, 1],
            vec![-1, 0, 1],
        )
    }

    #[test]
    fn new_accepts_valid_kernel() {
        let (v, dr, dc) = laplace_parts();
        let p = Propagator::new(v, dr, dc).unwrap();
        assert_eq!(p.krows(), 3);
        assert_eq!(p.kcols(), 3);
        assert_eq!(p.self_term(), -1.0);
        assert!((p.sum() - 0.0).abs() < 1e-15);
    }

    #[test]
    fn new_rejects_empty() {
        assert!(matches!(
            Propagator::new(vec![], vec![], vec![]),
            Err(ConfigError::EmptyKernel)
        ));
    }

    #[test]
    fn new_rejects_value_count_mismatch() {
        let (v, dr, _) = laplace_parts();
        assert!(matches!(
            Propagator::new(v, dr, vec![-1, 0]),
            Err(ConfigError::KernelValueCountMismatch {
                values: 9,
                expected: 6,
            })
        ));
    }

    #[test]
    fn new_rejects_missing_self_offset() {
        let (v, _, dc) = laplace_parts();
        assert!(matches!(
            Propagator::new(v, vec![1, 2, 3], dc),
            Err(ConfigError::MissingSelfOffset { axis: "rows" })
        ));
    }

    #[test]
    fn new_rejects_non_finite_values() {
        let (mut v, dr, dc) = laplace_parts();
        v[3] = f64::NAN;
        assert!(matches!(
            Propagator::new(v, dr, dc),
            Err(ConfigError::NonFiniteKernel { index: 3 })
        ));
    }

    #[test]
    fn conventions_distinguish_stress_and_strain() {
        let (v, dr, dc) = laplace_parts();
        let stress = Propagator::new(v, dr, dc).unwrap();
        assert!(follows_conventions(&stress, Imposed::Stress));
        assert!(!follows_conventions(&stress, Imposed::Strain));

        // Dropping the neighbour terms leaves sum -1: strain only.
        let strain =
            Propagator::new(vec![-1.0], vec![0], vec![0]).unwrap();
        assert!(follows_conventions(&strain, Imposed::Strain));
        assert!(!follows_conventions(&strain, Imposed::Stress));
    }

    #[test]
    fn conventions_reject_bad_self_term() {
        let p = Propagator::new(vec![-0.5], vec![0], vec![0]).unwrap();
        assert!(!follows_conventions(&p, Imposed::Strain));
    }
}
