//! The macroscopic loading convention.

use std::fmt;

/// Boundary-condition convention under which the lattice is driven.
///
/// The convention is fixed at construction and determines the
/// conservation property the interaction kernel must satisfy: a failure
/// either redistributes its stress drop with zero net change to the
/// spatial mean (imposed stress), or lets the mean stress drift by
/// `-drop / n` per failure (imposed strain).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Imposed {
    /// Macroscopic mean stress is a controlled invariant; the kernel
    /// entries sum to 0.
    Stress,
    /// Macroscopic mean stress drifts with failures; the kernel entries
    /// sum to -1.
    Strain,
}

impl Imposed {
    /// The total kernel sum required by this convention.
    pub fn kernel_sum(self) -> f64 {
        match self {
            Self::Stress => 0.0,
            Self::Strain => -1.0,
        }
    }
}

impl fmt::Display for Imposed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stress => write!(f, "stress"),
            Self::Strain => write!(f, "strain"),
        }
    }
}
