//! Error types for the EPM simulator.
//!
//! Two categories only: configuration errors, detected at construction
//! and never retried, and fatal stepping errors from the quasi-static
//! driver. Everything else is a total function over well-formed state.

use crate::imposed::Imposed;
use std::error::Error;
use std::fmt;

/// Errors detected while constructing a lattice, kernel, or system.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Attempted to construct a lattice with zero cells.
    EmptyLattice,
    /// A lattice dimension exceeds the addressable maximum.
    DimensionTooLarge {
        /// Which dimension (`"rows"` or `"cols"`).
        name: &'static str,
        /// The configured value.
        value: u32,
        /// The maximum allowed.
        max: u32,
    },
    /// An input array does not match the expected length.
    ShapeMismatch {
        /// Which array (`"sigmay_mean"`, `"sigma"`, ...).
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// A threshold mean is zero, negative, or non-finite.
    NonPositiveMean {
        /// Flat site index of the offending entry.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// A threshold standard deviation is negative or non-finite.
    InvalidStd {
        /// Flat site index of the offending entry.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// Kernel value array is empty.
    EmptyKernel,
    /// The kernel value array length is not the product of the offset
    /// array lengths.
    KernelValueCountMismatch {
        /// Length of the value array.
        values: usize,
        /// Product of the offset array lengths.
        expected: usize,
    },
    /// A kernel offset array has no zero entry, so the kernel has no
    /// self-interaction term.
    MissingSelfOffset {
        /// Which axis (`"rows"` or `"cols"`).
        axis: &'static str,
    },
    /// A kernel value is NaN or infinite.
    NonFiniteKernel {
        /// Flat index into the kernel value array.
        index: usize,
    },
    /// Two kernel offsets address the same lattice site under periodic
    /// wraparound (the kernel is too large for the lattice).
    KernelDoesNotFit {
        /// Which axis (`"rows"` or `"cols"`).
        axis: &'static str,
    },
    /// The kernel violates the declared loading convention.
    ConventionViolated {
        /// The declared convention.
        imposed: Imposed,
    },
    /// Requested kernel size is below the minimum of 3.
    KernelTooSmall {
        /// The requested linear size.
        size: usize,
    },
    /// A required builder field was not set.
    Missing {
        /// Name of the missing field.
        what: &'static str,
    },
    /// The per-failure time increment is zero, negative, or non-finite.
    InvalidTimeStep {
        /// The offending value.
        value: f64,
    },
    /// The initial relaxation requested at construction did not converge.
    InitRelax(StepError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLattice => write!(f, "lattice must have at least one site"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum of {max}")
            }
            Self::ShapeMismatch {
                what,
                expected,
                actual,
            } => write!(f, "{what} has length {actual}, expected {expected}"),
            Self::NonPositiveMean { index, value } => {
                write!(f, "sigmay_mean[{index}] = {value} must be finite and > 0")
            }
            Self::InvalidStd { index, value } => {
                write!(f, "sigmay_std[{index}] = {value} must be finite and >= 0")
            }
            Self::EmptyKernel => write!(f, "kernel value array is empty"),
            Self::KernelValueCountMismatch { values, expected } => write!(
                f,
                "kernel has {values} values, offset arrays imply {expected}"
            ),
            Self::MissingSelfOffset { axis } => {
                write!(f, "kernel offset array for {axis} axis has no zero entry")
            }
            Self::NonFiniteKernel { index } => {
                write!(f, "kernel value at flat index {index} is not finite")
            }
            Self::KernelDoesNotFit { axis } => write!(
                f,
                "kernel offsets collide under wraparound on {axis} axis (kernel larger than lattice)"
            ),
            Self::ConventionViolated { imposed } => {
                write!(f, "kernel does not follow the imposed-{imposed} convention")
            }
            Self::KernelTooSmall { size } => {
                write!(f, "kernel size {size} is below the minimum of 3")
            }
            Self::Missing { what } => write!(f, "{what} is required"),
            Self::InvalidTimeStep { value } => {
                write!(f, "dt must be finite and > 0, got {value}")
            }
            Self::InitRelax(e) => write!(f, "initial relaxation failed: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InitRelax(e) => Some(e),
            _ => None,
        }
    }
}

/// Fatal errors from quasi-static driving.
///
/// Both variants indicate an ill-posed kernel/threshold combination;
/// the simulation run must be escalated as failed, never resumed from
/// a partially-relaxed field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepError {
    /// Avalanche relaxation did not reach a stable configuration within
    /// the sweep budget.
    NonConvergence {
        /// Number of synchronous failure sweeps performed.
        sweeps: u64,
        /// Number of sites still over threshold when the budget ran out.
        unstable: usize,
    },
    /// Repeated load increments produced no failures.
    Stalled {
        /// Number of consecutive zero-failure driving rounds.
        rounds: u64,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonConvergence { sweeps, unstable } => write!(
                f,
                "avalanche did not stabilize after {sweeps} sweeps ({unstable} sites over threshold)"
            ),
            Self::Stalled { rounds } => {
                write!(f, "no failures after {rounds} consecutive load increments")
            }
        }
    }
}

impl Error for StepError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_offending_values() {
        let e = ConfigError::NonPositiveMean {
            index: 7,
            value: -0.5,
        };
        assert!(e.to_string().contains("sigmay_mean[7]"));

        let e = ConfigError::KernelValueCountMismatch {
            values: 9,
            expected: 6,
        };
        assert!(e.to_string().contains("9 values"));

        let e = StepError::NonConvergence {
            sweeps: 10,
            unstable: 3,
        };
        assert!(e.to_string().contains("10 sweeps"));
    }

    #[test]
    fn init_relax_exposes_source() {
        use std::error::Error as _;
        let e = ConfigError::InitRelax(StepError::Stalled { rounds: 4 });
        assert!(e.source().is_some());
    }
}
